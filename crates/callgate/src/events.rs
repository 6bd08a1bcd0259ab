//! Event types for the gateway pipeline.
//!
//! Component-level detail (admissions, state transitions, slot releases) is
//! emitted by the breaker and bulkhead crates; these events cover the
//! per-call resolution the surrounding service usually cares about.

use callgate_core::CallEvent;
use std::time::{Duration, Instant};

/// Events emitted once per `invoke`.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    /// The guarded call returned a real response.
    CallSucceeded {
        /// Name of the dependency
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// Wall time spent in the underlying call
        elapsed: Duration,
    },
    /// The call resolved to the dependency's fallback value.
    FallbackServed {
        /// Name of the dependency
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// Classification of the failure, as
        /// [`InvokeError::kind`](callgate_core::InvokeError::kind)
        reason: &'static str,
    },
}

impl CallEvent for GatewayEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GatewayEvent::CallSucceeded { .. } => "gateway.call_succeeded",
            GatewayEvent::FallbackServed { .. } => "gateway.fallback_served",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            GatewayEvent::CallSucceeded { timestamp, .. }
            | GatewayEvent::FallbackServed { timestamp, .. } => *timestamp,
        }
    }

    fn dependency(&self) -> &str {
        match self {
            GatewayEvent::CallSucceeded { dependency, .. }
            | GatewayEvent::FallbackServed { dependency, .. } => dependency,
        }
    }
}
