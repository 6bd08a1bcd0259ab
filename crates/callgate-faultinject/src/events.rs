//! Event types for the fault-injection decorator.

use callgate_core::CallEvent;
use std::time::{Duration, Instant};

/// Events emitted by the fault injector.
#[derive(Debug, Clone)]
pub enum FaultInjectEvent {
    /// The call was delayed before being forwarded.
    DelayInjected {
        /// Name of the decorated dependency
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// The injected delay
        delay: Duration,
    },
    /// The call was forwarded untouched.
    PassedThrough {
        /// Name of the decorated dependency
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
    },
}

impl CallEvent for FaultInjectEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FaultInjectEvent::DelayInjected { .. } => "faultinject.delay_injected",
            FaultInjectEvent::PassedThrough { .. } => "faultinject.passed_through",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FaultInjectEvent::DelayInjected { timestamp, .. }
            | FaultInjectEvent::PassedThrough { timestamp, .. } => *timestamp,
        }
    }

    fn dependency(&self) -> &str {
        match self {
            FaultInjectEvent::DelayInjected { dependency, .. }
            | FaultInjectEvent::PassedThrough { dependency, .. } => dependency,
        }
    }
}
