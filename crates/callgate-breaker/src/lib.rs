//! Circuit breaker for guarded dependency calls.
//!
//! A breaker watches the recent outcomes of calls to one dependency and stops
//! admitting calls while the dependency looks unhealthy, so callers fail fast
//! instead of piling up on a struggling remote service.
//!
//! ## States
//! - **Closed**: normal operation; outcomes feed the sliding window
//! - **Open**: calls refused until the configured wait elapses
//! - **HalfOpen**: a bounded number of trial calls probe recovery
//!
//! The breaker is a cheap cloneable handle; clones share state. The gateway
//! calls [`try_call`](CircuitBreaker::try_call) before attempting the
//! underlying call and [`on_result`](CircuitBreaker::on_result) exactly once
//! after an admitted call completes.
//!
//! ```rust
//! use callgate_breaker::{BreakerConfig, CallOutcome, CircuitBreaker};
//! use std::time::Duration;
//!
//! let breaker = CircuitBreaker::new(
//!     BreakerConfig::builder()
//!         .name("firm")
//!         .failure_threshold(0.5)
//!         .min_samples(4)
//!         .window_size(4)
//!         .open_wait(Duration::from_secs(5))
//!         .build(),
//! );
//!
//! if breaker.try_call() {
//!     // ... perform the call ...
//!     breaker.on_result(CallOutcome::Success);
//! }
//! ```

#[cfg(feature = "metrics")]
use metrics::{describe_counter, describe_gauge};
use std::sync::atomic::{AtomicU8, Ordering};
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::sync::{Arc, Mutex, PoisonError};

pub use circuit::{BreakerMetrics, BreakerState};
pub use config::{BreakerConfig, BreakerConfigBuilder};
pub use events::BreakerEvent;
pub use window::{CallOutcome, OutcomeWindow};

mod circuit;
mod config;
mod events;
mod window;

use circuit::Circuit;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

struct Shared {
    circuit: Mutex<Circuit>,
    state_atomic: Arc<AtomicU8>,
    config: BreakerConfig,
}

/// A circuit breaker for one dependency.
///
/// Cloning is cheap and all clones share the same state. Mutation is
/// serialized behind an internal lock whose critical sections are short and
/// never held across an await point; the current state is mirrored into an
/// atomic for lock-free reads.
#[derive(Clone)]
pub struct CircuitBreaker {
    shared: Arc<Shared>,
}

impl CircuitBreaker {
    /// Creates a new breaker in the Closed state.
    pub fn new(config: BreakerConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "breaker_outcomes_total",
                "Recorded outcomes of admitted calls, by outcome"
            );
            describe_counter!(
                "breaker_transitions_total",
                "Circuit state transitions, by from/to state"
            );
            describe_counter!(
                "breaker_calls_refused_total",
                "Calls refused by an open or exhausted half-open circuit"
            );
            describe_gauge!("breaker_state", "Current circuit state (0 closed, 1 open, 2 half-open)");
        });

        let state_atomic = Arc::new(AtomicU8::new(BreakerState::Closed as u8));
        let window = OutcomeWindow::new(config.window_size, config.min_samples);
        Self {
            shared: Arc::new(Shared {
                circuit: Mutex::new(Circuit::new(Arc::clone(&state_atomic), window)),
                state_atomic,
                config,
            }),
        }
    }

    /// Asks the breaker whether a call may proceed.
    ///
    /// Returns `true` when the call is admitted. A `false` return must not be
    /// followed by [`on_result`](Self::on_result); refusals record no outcome.
    pub fn try_call(&self) -> bool {
        self.lock_circuit().try_acquire(&self.shared.config)
    }

    /// Records the outcome of an admitted call.
    ///
    /// Must be called exactly once per `try_call` that returned `true`. May
    /// trip the circuit (Closed -> Open), reopen it (HalfOpen -> Open), or
    /// close it and clear the window (HalfOpen -> Closed).
    pub fn on_result(&self, outcome: CallOutcome) {
        self.lock_circuit().record(&self.shared.config, outcome);
    }

    /// Returns the current state without locking.
    pub fn state(&self) -> BreakerState {
        BreakerState::from_u8(self.shared.state_atomic.load(Ordering::Acquire))
    }

    /// Returns whether the circuit is currently open.
    pub fn is_open(&self) -> bool {
        self.state() == BreakerState::Open
    }

    /// Returns a consistent snapshot of the breaker's counters and state.
    pub fn metrics(&self) -> BreakerMetrics {
        self.lock_circuit().metrics()
    }

    /// Forces the circuit open, e.g. for maintenance windows.
    ///
    /// Forcing an already-open circuit restarts the open wait.
    pub fn force_open(&self) {
        self.lock_circuit().force_open(&self.shared.config);
    }

    /// Resets the circuit to Closed and clears the outcome window.
    pub fn reset(&self) {
        self.lock_circuit().reset(&self.shared.config);
    }

    /// Name of the dependency this breaker guards.
    pub fn name(&self) -> &str {
        self.shared.config.name()
    }

    fn lock_circuit(&self) -> std::sync::MutexGuard<'_, Circuit> {
        // A poisoned lock only means a listener panicked mid-emit; the
        // circuit data itself is still coherent.
        self.shared
            .circuit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
