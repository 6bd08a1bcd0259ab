//! Event types emitted by the bulkhead.

use callgate_core::CallEvent;
use std::time::{Duration, Instant};

/// Events emitted by a bulkhead instance.
#[derive(Debug, Clone)]
pub enum BulkheadEvent {
    /// A call was admitted and now holds a slot.
    CallAdmitted {
        /// Name of the dependency this bulkhead isolates
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// In-flight calls after this admission
        in_flight: usize,
    },
    /// A call was rejected because all slots were taken.
    CallRejected {
        /// Name of the dependency this bulkhead isolates
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// The concurrency ceiling that was hit
        max_concurrency: usize,
    },
    /// An admitted call released its slot.
    SlotReleased {
        /// Name of the dependency this bulkhead isolates
        dependency: String,
        /// When the event occurred
        timestamp: Instant,
        /// How long the slot was held
        held_for: Duration,
    },
}

impl CallEvent for BulkheadEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BulkheadEvent::CallAdmitted { .. } => "bulkhead.call_admitted",
            BulkheadEvent::CallRejected { .. } => "bulkhead.call_rejected",
            BulkheadEvent::SlotReleased { .. } => "bulkhead.slot_released",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            BulkheadEvent::CallAdmitted { timestamp, .. }
            | BulkheadEvent::CallRejected { timestamp, .. }
            | BulkheadEvent::SlotReleased { timestamp, .. } => *timestamp,
        }
    }

    fn dependency(&self) -> &str {
        match self {
            BulkheadEvent::CallAdmitted { dependency, .. }
            | BulkheadEvent::CallRejected { dependency, .. }
            | BulkheadEvent::SlotReleased { dependency, .. } => dependency,
        }
    }
}
