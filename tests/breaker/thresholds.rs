//! Threshold evaluation against the sliding outcome window.

use callgate_breaker::{BreakerConfig, BreakerState, CallOutcome, CircuitBreaker};
use std::time::Duration;

fn breaker(threshold: f64, min_samples: usize, window_size: usize) -> CircuitBreaker {
    CircuitBreaker::new(
        BreakerConfig::builder()
            .name("threshold-test")
            .failure_threshold(threshold)
            .min_samples(min_samples)
            .window_size(window_size)
            .open_wait(Duration::from_secs(60))
            .build(),
    )
}

#[test]
fn trips_before_the_next_admission() {
    let cb = breaker(0.5, 4, 4);

    cb.on_result(CallOutcome::Failure);
    cb.on_result(CallOutcome::Failure);
    cb.on_result(CallOutcome::Success);
    assert!(cb.try_call(), "below sample floor, still admitting");
    cb.on_result(CallOutcome::Success);

    // Ratio hit 0.5 at the fourth recorded outcome; no further call may be
    // admitted before the transition takes effect.
    assert_eq!(cb.state(), BreakerState::Open);
    assert!(!cb.try_call());
}

#[test]
fn failure_order_within_the_window_is_irrelevant() {
    let orders = [
        [
            CallOutcome::Failure,
            CallOutcome::Failure,
            CallOutcome::Success,
            CallOutcome::Success,
        ],
        [
            CallOutcome::Success,
            CallOutcome::Failure,
            CallOutcome::Success,
            CallOutcome::Failure,
        ],
        [
            CallOutcome::Success,
            CallOutcome::Success,
            CallOutcome::Failure,
            CallOutcome::Failure,
        ],
    ];

    for order in orders {
        let cb = breaker(0.5, 4, 4);
        for outcome in order {
            cb.on_result(outcome);
        }
        assert_eq!(cb.state(), BreakerState::Open, "order: {order:?}");
    }
}

#[test]
fn timeouts_count_as_failures() {
    let cb = breaker(0.5, 4, 4);

    cb.on_result(CallOutcome::Timeout);
    cb.on_result(CallOutcome::Success);
    cb.on_result(CallOutcome::Timeout);
    cb.on_result(CallOutcome::Success);

    assert_eq!(cb.state(), BreakerState::Open);
}

#[test]
fn no_evaluation_below_the_sample_floor() {
    let cb = breaker(0.5, 10, 20);

    // Nine straight failures: ratio 1.0 but below the floor.
    for _ in 0..9 {
        cb.on_result(CallOutcome::Failure);
    }
    assert_eq!(cb.state(), BreakerState::Closed);
    assert!(cb.try_call());

    cb.on_result(CallOutcome::Failure);
    assert_eq!(cb.state(), BreakerState::Open);
}

#[test]
fn window_slides_rather_than_resetting_on_trip() {
    let cb = breaker(1.0, 2, 2);

    cb.on_result(CallOutcome::Failure);
    cb.on_result(CallOutcome::Failure);
    assert_eq!(cb.state(), BreakerState::Open);

    // Both failures are still in the window after the trip.
    let metrics = cb.metrics();
    assert_eq!(metrics.recorded_calls, 2);
    assert_eq!(metrics.failure_count, 2);
    assert_eq!(metrics.failure_ratio, 1.0);
}

#[test]
fn old_outcomes_are_evicted_by_new_ones() {
    let cb = breaker(0.9, 4, 4);

    cb.on_result(CallOutcome::Failure);
    cb.on_result(CallOutcome::Failure);
    for _ in 0..4 {
        cb.on_result(CallOutcome::Success);
    }

    // The failures slid out; the window holds four successes.
    let metrics = cb.metrics();
    assert_eq!(metrics.recorded_calls, 4);
    assert_eq!(metrics.failure_count, 0);
    assert_eq!(cb.state(), BreakerState::Closed);
}
