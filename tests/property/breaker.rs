//! State machine invariants over arbitrary outcome sequences.

use callgate_breaker::{BreakerConfig, BreakerState, CallOutcome, CircuitBreaker};
use proptest::prelude::*;
use std::time::Duration;

fn outcome() -> impl Strategy<Value = CallOutcome> {
    prop_oneof![
        Just(CallOutcome::Success),
        Just(CallOutcome::Failure),
        Just(CallOutcome::Timeout),
    ]
}

fn breaker(threshold: f64, min_samples: usize, window_size: usize) -> CircuitBreaker {
    CircuitBreaker::new(
        BreakerConfig::builder()
            .name("property-test")
            .failure_threshold(threshold)
            .min_samples(min_samples)
            .window_size(window_size)
            // Effectively never; these properties only exercise Closed/Open.
            .open_wait(Duration::from_secs(3600))
            .build(),
    )
}

proptest! {
    /// Driving the breaker the way the gateway does (record only admitted
    /// calls), a Closed breaker always has a window below the trip point.
    #[test]
    fn closed_implies_below_threshold(
        outcomes in prop::collection::vec(outcome(), 0..64),
        min_samples in 1usize..8,
        window_size in 8usize..16,
    ) {
        let cb = breaker(0.5, min_samples, window_size);
        for o in outcomes {
            if cb.try_call() {
                cb.on_result(o);
            }
        }
        if cb.state() == BreakerState::Closed {
            let m = cb.metrics();
            prop_assert!(
                m.recorded_calls < min_samples || m.failure_ratio < 0.5,
                "closed with {} recorded, ratio {}",
                m.recorded_calls,
                m.failure_ratio
            );
        }
    }

    /// Once open (with an hour-long wait), no call is admitted and the
    /// window stops moving.
    #[test]
    fn open_admits_nothing(
        outcomes in prop::collection::vec(outcome(), 0..64),
    ) {
        let cb = breaker(0.5, 2, 4);
        for o in outcomes {
            if cb.try_call() {
                cb.on_result(o);
            }
        }
        if cb.state() == BreakerState::Open {
            let frozen = cb.metrics().recorded_calls;
            for _ in 0..8 {
                prop_assert!(!cb.try_call());
            }
            prop_assert_eq!(cb.metrics().recorded_calls, frozen);
        }
    }

    /// Successes alone can never trip the circuit.
    #[test]
    fn successes_never_trip(count in 0usize..128) {
        let cb = breaker(0.5, 1, 8);
        for _ in 0..count {
            prop_assert!(cb.try_call());
            cb.on_result(CallOutcome::Success);
        }
        prop_assert_eq!(cb.state(), BreakerState::Closed);
    }
}
