//! The circuit state machine.
//!
//! All mutation happens behind the owning breaker's lock; the current state is
//! mirrored into an `AtomicU8` so observers can read it without locking.

use crate::config::BreakerConfig;
use crate::events::BreakerEvent;
use crate::window::{CallOutcome, OutcomeWindow};
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BreakerState {
    /// Calls are admitted; outcomes are evaluated against the trip threshold.
    Closed = 0,
    /// Calls are refused until the open wait elapses.
    Open = 1,
    /// A limited number of trial calls are admitted to probe recovery.
    HalfOpen = 2,
}

impl BreakerState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => BreakerState::Open,
            2 => BreakerState::HalfOpen,
            _ => BreakerState::Closed,
        }
    }

    /// A short static label for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

/// Point-in-time snapshot of a breaker's internal state.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerMetrics {
    /// Current state.
    pub state: BreakerState,
    /// Outcomes currently in the sliding window.
    pub recorded_calls: usize,
    /// Failures and timeouts in the window.
    pub failure_count: usize,
    /// Successes in the window.
    pub success_count: usize,
    /// Current failure ratio (0.0 below the minimum sample count).
    pub failure_ratio: f64,
    /// Time since the last state transition.
    pub time_since_transition: Duration,
}

pub(crate) struct Circuit {
    state: BreakerState,
    state_atomic: Arc<AtomicU8>,
    last_transition: Instant,
    window: OutcomeWindow,
    /// Trial permits handed out since entering HalfOpen (counted at
    /// admission, so concurrent excess trials are refused).
    half_open_issued: usize,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>, window: OutcomeWindow) -> Self {
        Self {
            state: BreakerState::Closed,
            state_atomic,
            last_transition: Instant::now(),
            window,
            half_open_issued: 0,
        }
    }

    pub(crate) fn state(&self) -> BreakerState {
        self.state
    }

    pub(crate) fn metrics(&self) -> BreakerMetrics {
        BreakerMetrics {
            state: self.state,
            recorded_calls: self.window.len(),
            failure_count: self.window.failure_count(),
            success_count: self.window.success_count(),
            failure_ratio: self.window.failure_ratio(),
            time_since_transition: self.last_transition.elapsed(),
        }
    }

    /// Decides whether a call may proceed, moving Open -> HalfOpen when the
    /// wait has elapsed. The caller that triggers that move consumes the
    /// first trial permit.
    pub(crate) fn try_acquire(&mut self, config: &BreakerConfig) -> bool {
        match self.state {
            BreakerState::Closed => {
                self.emit_permitted(config);
                true
            }
            BreakerState::Open => {
                if self.last_transition.elapsed() >= config.open_wait {
                    self.transition_to(BreakerState::HalfOpen, config);
                    self.half_open_issued = 1;
                    self.emit_permitted(config);
                    true
                } else {
                    self.emit_refused(config);
                    false
                }
            }
            BreakerState::HalfOpen => {
                if self.half_open_issued < config.half_open_trial_permits {
                    self.half_open_issued += 1;
                    self.emit_permitted(config);
                    true
                } else {
                    self.emit_refused(config);
                    false
                }
            }
        }
    }

    /// Records the outcome of an admitted call and applies any resulting
    /// state transition.
    pub(crate) fn record(&mut self, config: &BreakerConfig, outcome: CallOutcome) {
        self.window.record(outcome);

        config
            .event_listeners
            .emit(&BreakerEvent::OutcomeRecorded {
                dependency: config.name.clone(),
                timestamp: Instant::now(),
                outcome,
                state: self.state,
            });

        #[cfg(feature = "metrics")]
        counter!("breaker_outcomes_total", "dependency" => config.name.clone(), "outcome" => outcome.label())
            .increment(1);

        match self.state {
            BreakerState::Closed => {
                if self.window.failure_ratio() >= config.failure_threshold {
                    self.transition_to(BreakerState::Open, config);
                }
            }
            BreakerState::HalfOpen => {
                if outcome.counts_as_failure() {
                    self.transition_to(BreakerState::Open, config);
                } else {
                    // One successful trial is enough evidence of recovery.
                    self.transition_to(BreakerState::Closed, config);
                    self.window.reset();
                }
            }
            // Outcomes of calls admitted before the trip still land in the
            // window but cannot cause a transition while Open.
            BreakerState::Open => {}
        }
    }

    pub(crate) fn force_open(&mut self, config: &BreakerConfig) {
        if self.state == BreakerState::Open {
            // Already open: restart the wait so the caller always gets a
            // full open window from the moment of the force.
            self.last_transition = Instant::now();
            return;
        }
        self.transition_to(BreakerState::Open, config);
    }

    pub(crate) fn reset(&mut self, config: &BreakerConfig) {
        self.transition_to(BreakerState::Closed, config);
        self.window.reset();
    }

    fn transition_to(&mut self, state: BreakerState, config: &BreakerConfig) {
        if self.state == state {
            return;
        }

        let from = self.state;
        config.event_listeners.emit(&BreakerEvent::StateTransition {
            dependency: config.name.clone(),
            timestamp: Instant::now(),
            from,
            to: state,
        });

        #[cfg(feature = "tracing")]
        tracing::info!(
            dependency = %config.name,
            from = from.label(),
            to = state.label(),
            "circuit state transition"
        );

        #[cfg(feature = "metrics")]
        {
            counter!(
                "breaker_transitions_total",
                "dependency" => config.name.clone(),
                "from" => from.label(),
                "to" => state.label()
            )
            .increment(1);
            gauge!("breaker_state", "dependency" => config.name.clone()).set(state as u8 as f64);
        }

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_transition = Instant::now();
        self.half_open_issued = 0;
    }

    fn emit_permitted(&self, config: &BreakerConfig) {
        config.event_listeners.emit(&BreakerEvent::CallPermitted {
            dependency: config.name.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });
    }

    fn emit_refused(&self, config: &BreakerConfig) {
        config.event_listeners.emit(&BreakerEvent::CallRefused {
            dependency: config.name.clone(),
            timestamp: Instant::now(),
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(dependency = %config.name, "circuit refused call");

        #[cfg(feature = "metrics")]
        counter!("breaker_calls_refused_total", "dependency" => config.name.clone()).increment(1);
    }
}
