//! Configuration for the bulkhead.

use crate::events::BulkheadEvent;
use callgate_core::events::{EventListeners, FnListener};

/// Configuration for a bulkhead instance.
#[derive(Clone)]
pub struct BulkheadConfig {
    /// Maximum number of concurrent in-flight calls.
    pub(crate) max_concurrency: usize,
    /// Name of the dependency this bulkhead isolates.
    pub(crate) name: String,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<BulkheadEvent>,
}

impl BulkheadConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> BulkheadConfigBuilder {
        BulkheadConfigBuilder::new()
    }
}

/// Builder for [`BulkheadConfig`].
pub struct BulkheadConfigBuilder {
    max_concurrency: usize,
    name: String,
    event_listeners: EventListeners<BulkheadEvent>,
}

impl BulkheadConfigBuilder {
    /// Creates a builder with default values.
    pub fn new() -> Self {
        Self {
            max_concurrency: 25,
            name: "bulkhead".to_string(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the maximum number of concurrent in-flight calls.
    ///
    /// Default: 25
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Sets the dependency name used in events, logs, and metrics.
    ///
    /// Default: "bulkhead"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a call is admitted.
    ///
    /// The callback receives the number of in-flight calls after this
    /// admission, between 1 and `max_concurrency` inclusive.
    pub fn on_call_admitted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::CallAdmitted { in_flight, .. } = event {
                f(*in_flight);
            }
        }));
        self
    }

    /// Registers a callback when a call is rejected at capacity.
    ///
    /// The callback receives the configured concurrency ceiling.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::CallRejected {
                max_concurrency, ..
            } = event
            {
                f(*max_concurrency);
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> BulkheadConfig {
        BulkheadConfig {
            max_concurrency: self.max_concurrency,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for BulkheadConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
