//! Bulkhead: per-dependency concurrency admission limiting.
//!
//! A bulkhead caps the number of in-flight calls to one dependency so a slow
//! or hung remote service cannot exhaust the caller's resources, independently
//! of whether the circuit breaker is closed. Admission is non-blocking: a call
//! either takes a slot immediately or is rejected, never queued.
//!
//! The slot is an RAII permit; dropping it releases the slot, so release
//! happens exactly once on every exit path including timeouts, panics, and
//! caller cancellation.
//!
//! ```rust
//! use callgate_bulkhead::{Bulkhead, BulkheadConfig};
//!
//! let bulkhead = Bulkhead::new(
//!     BulkheadConfig::builder()
//!         .name("license")
//!         .max_concurrency(2)
//!         .build(),
//! );
//!
//! let first = bulkhead.try_admit().expect("slot free");
//! let second = bulkhead.try_admit().expect("slot free");
//! assert!(bulkhead.try_admit().is_none(), "at capacity");
//!
//! drop(first);
//! assert!(bulkhead.try_admit().is_some());
//! # drop(second);
//! ```

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub use config::{BulkheadConfig, BulkheadConfigBuilder};
pub use events::BulkheadEvent;

mod config;
mod events;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

struct Shared {
    semaphore: Arc<Semaphore>,
    config: BulkheadConfig,
}

/// A concurrency admission limiter for one dependency.
///
/// Cloning is cheap and all clones share the same slots.
#[derive(Clone)]
pub struct Bulkhead {
    shared: Arc<Shared>,
}

impl Bulkhead {
    /// Creates a bulkhead with `max_concurrency` free slots.
    pub fn new(config: BulkheadConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "bulkhead_calls_admitted_total",
                "Calls that took an in-flight slot"
            );
            describe_counter!(
                "bulkhead_calls_rejected_total",
                "Calls rejected because all slots were taken"
            );
            describe_gauge!("bulkhead_in_flight", "Calls currently holding a slot");
        });

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
        Self {
            shared: Arc::new(Shared { semaphore, config }),
        }
    }

    /// Attempts to take a slot.
    ///
    /// The check and the increment are a single atomic operation on the
    /// underlying semaphore; concurrent callers cannot race past the ceiling.
    /// Returns `None` immediately when all slots are taken.
    pub fn try_admit(&self) -> Option<AdmissionPermit> {
        let config = &self.shared.config;
        match Arc::clone(&self.shared.semaphore).try_acquire_owned() {
            Ok(permit) => {
                let in_flight = self.in_flight();
                config.event_listeners.emit(&BulkheadEvent::CallAdmitted {
                    dependency: config.name.clone(),
                    timestamp: Instant::now(),
                    in_flight,
                });

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    dependency = %config.name,
                    in_flight,
                    "bulkhead admitted call"
                );

                #[cfg(feature = "metrics")]
                {
                    counter!("bulkhead_calls_admitted_total", "dependency" => config.name.clone())
                        .increment(1);
                    gauge!("bulkhead_in_flight", "dependency" => config.name.clone())
                        .set(in_flight as f64);
                }

                Some(AdmissionPermit {
                    _permit: permit,
                    shared: Arc::clone(&self.shared),
                    admitted_at: Instant::now(),
                })
            }
            Err(_) => {
                config.event_listeners.emit(&BulkheadEvent::CallRejected {
                    dependency: config.name.clone(),
                    timestamp: Instant::now(),
                    max_concurrency: config.max_concurrency,
                });

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    dependency = %config.name,
                    max_concurrency = config.max_concurrency,
                    "bulkhead rejected call"
                );

                #[cfg(feature = "metrics")]
                counter!("bulkhead_calls_rejected_total", "dependency" => config.name.clone())
                    .increment(1);

                None
            }
        }
    }

    /// Number of calls currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.shared.config.max_concurrency - self.shared.semaphore.available_permits()
    }

    /// The configured concurrency ceiling.
    pub fn max_concurrency(&self) -> usize {
        self.shared.config.max_concurrency
    }
}

/// An RAII slot in the bulkhead.
///
/// Dropping the permit releases the slot; there is no other way to release,
/// so release is exactly once per admission on every exit path.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    shared: Arc<Shared>,
    admitted_at: Instant,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        let config = &self.shared.config;
        config.event_listeners.emit(&BulkheadEvent::SlotReleased {
            dependency: config.name.clone(),
            timestamp: Instant::now(),
            held_for: self.admitted_at.elapsed(),
        });

        // The semaphore permit is returned after this runs, so the post-drop
        // in-flight count is one less than currently visible.
        #[cfg(feature = "metrics")]
        {
            let remaining = config
                .max_concurrency
                .saturating_sub(self.shared.semaphore.available_permits() + 1);
            gauge!("bulkhead_in_flight", "dependency" => config.name.clone())
                .set(remaining as f64);
        }
    }
}
