//! Configuration for the circuit breaker.

use crate::circuit::BreakerState;
use crate::events::BreakerEvent;
use callgate_core::events::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for a circuit breaker instance.
#[derive(Clone)]
pub struct BreakerConfig {
    /// Name of the dependency this breaker guards.
    pub(crate) name: String,
    /// Failure ratio at or above which the circuit trips, in `(0, 1]`.
    pub(crate) failure_threshold: f64,
    /// Minimum recorded outcomes before the ratio is meaningful.
    pub(crate) min_samples: usize,
    /// Capacity of the sliding outcome window.
    pub(crate) window_size: usize,
    /// How long the circuit stays open before probing recovery.
    pub(crate) open_wait: Duration,
    /// Trial calls admitted while half-open.
    pub(crate) half_open_trial_permits: usize,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<BreakerEvent>,
}

impl BreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> BreakerConfigBuilder {
        BreakerConfigBuilder::new()
    }

    /// Name of the dependency this breaker guards.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`BreakerConfig`].
pub struct BreakerConfigBuilder {
    name: String,
    failure_threshold: f64,
    min_samples: usize,
    window_size: usize,
    open_wait: Duration,
    half_open_trial_permits: usize,
    event_listeners: EventListeners<BreakerEvent>,
}

impl BreakerConfigBuilder {
    /// Creates a builder with default values.
    pub fn new() -> Self {
        Self {
            name: "breaker".to_string(),
            failure_threshold: 0.5,
            min_samples: 10,
            window_size: 20,
            open_wait: Duration::from_secs(30),
            half_open_trial_permits: 1,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the dependency name used in events, logs, and metrics.
    ///
    /// Default: "breaker"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the failure ratio at which the circuit trips.
    ///
    /// Default: 0.5
    pub fn failure_threshold(mut self, threshold: f64) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets the minimum sample count before the failure ratio can trip the
    /// circuit.
    ///
    /// Default: 10
    pub fn min_samples(mut self, min: usize) -> Self {
        self.min_samples = min;
        self
    }

    /// Sets the sliding window capacity.
    ///
    /// Default: 20
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Sets how long the circuit stays open before admitting trial calls.
    ///
    /// Default: 30s
    pub fn open_wait(mut self, wait: Duration) -> Self {
        self.open_wait = wait;
        self
    }

    /// Sets the number of trial calls admitted while half-open.
    ///
    /// Default: 1
    pub fn half_open_trial_permits(mut self, permits: usize) -> Self {
        self.half_open_trial_permits = permits;
        self
    }

    /// Registers a callback for state transitions.
    ///
    /// # Example
    /// ```rust
    /// use callgate_breaker::BreakerConfig;
    ///
    /// let config = BreakerConfig::builder()
    ///     .name("license")
    ///     .on_state_transition(|from, to| {
    ///         println!("license breaker: {:?} -> {:?}", from, to);
    ///     })
    ///     .build();
    /// ```
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(BreakerState, BreakerState) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let BreakerEvent::StateTransition { from, to, .. } = event {
                f(*from, *to);
            }
        }));
        self
    }

    /// Registers a callback invoked each time the breaker refuses a call.
    pub fn on_call_refused<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, BreakerEvent::CallRefused { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> BreakerConfig {
        BreakerConfig {
            name: self.name,
            failure_threshold: self.failure_threshold,
            min_samples: self.min_samples,
            window_size: self.window_size,
            open_wait: self.open_wait,
            half_open_trial_permits: self.half_open_trial_permits,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for BreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
