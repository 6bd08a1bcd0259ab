//! Event types emitted by the circuit breaker.

use crate::circuit::BreakerState;
use crate::window::CallOutcome;
use callgate_core::CallEvent;
use std::time::Instant;

/// Events emitted by a circuit breaker instance.
#[derive(Debug, Clone)]
pub enum BreakerEvent {
    /// The breaker moved from one state to another.
    StateTransition {
        /// Name of the dependency this breaker guards
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// State before the transition
        from: BreakerState,
        /// State after the transition
        to: BreakerState,
    },
    /// A call was admitted.
    CallPermitted {
        /// Name of the dependency this breaker guards
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// State the breaker was in when the call was admitted
        state: BreakerState,
    },
    /// A call was refused (circuit open, or half-open permits exhausted).
    CallRefused {
        /// Name of the dependency this breaker guards
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
    },
    /// An admitted call completed and its outcome was recorded.
    OutcomeRecorded {
        /// Name of the dependency this breaker guards
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// The recorded outcome
        outcome: CallOutcome,
        /// State the breaker was in when the outcome arrived
        state: BreakerState,
    },
}

impl CallEvent for BreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BreakerEvent::StateTransition { .. } => "breaker.state_transition",
            BreakerEvent::CallPermitted { .. } => "breaker.call_permitted",
            BreakerEvent::CallRefused { .. } => "breaker.call_refused",
            BreakerEvent::OutcomeRecorded { .. } => "breaker.outcome_recorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            BreakerEvent::StateTransition { timestamp, .. }
            | BreakerEvent::CallPermitted { timestamp, .. }
            | BreakerEvent::CallRefused { timestamp, .. }
            | BreakerEvent::OutcomeRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn dependency(&self) -> &str {
        match self {
            BreakerEvent::StateTransition { dependency, .. }
            | BreakerEvent::CallPermitted { dependency, .. }
            | BreakerEvent::CallRefused { dependency, .. }
            | BreakerEvent::OutcomeRecorded { dependency, .. } => dependency,
        }
    }
}
