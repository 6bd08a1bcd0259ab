//! Per-dependency configuration for the gateway.

use crate::error::ConfigError;
use crate::events::GatewayEvent;
use callgate_core::events::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for one guarded dependency.
///
/// Collects the knobs for every stage of the pipeline: the bulkhead ceiling,
/// the call timeout, and the breaker's window and state-machine parameters.
/// Validated as a whole by [`RegistryBuilder::build`].
///
/// [`RegistryBuilder::build`]: crate::RegistryBuilder::build
#[derive(Clone)]
pub struct DependencyConfig {
    pub(crate) name: String,
    pub(crate) max_concurrency: usize,
    pub(crate) call_timeout: Duration,
    pub(crate) failure_threshold: f64,
    pub(crate) min_samples: usize,
    pub(crate) window_size: usize,
    pub(crate) open_wait: Duration,
    pub(crate) half_open_trial_permits: usize,
    pub(crate) event_listeners: EventListeners<GatewayEvent>,
}

impl DependencyConfig {
    /// Creates a new configuration builder for the named dependency.
    pub fn builder(name: impl Into<String>) -> DependencyConfigBuilder {
        DependencyConfigBuilder::new(name)
    }

    /// Name of the dependency.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency {
                name: self.name.clone(),
            });
        }
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindowSize {
                name: self.name.clone(),
            });
        }
        if self.half_open_trial_permits == 0 {
            return Err(ConfigError::ZeroTrialPermits {
                name: self.name.clone(),
            });
        }
        if !(self.failure_threshold > 0.0 && self.failure_threshold <= 1.0) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: self.name.clone(),
                value: self.failure_threshold,
            });
        }
        if self.min_samples > self.window_size {
            return Err(ConfigError::MinSamplesExceedsWindow {
                name: self.name.clone(),
                min_samples: self.min_samples,
                window_size: self.window_size,
            });
        }
        Ok(())
    }
}

/// Builder for [`DependencyConfig`].
pub struct DependencyConfigBuilder {
    name: String,
    max_concurrency: usize,
    call_timeout: Duration,
    failure_threshold: f64,
    min_samples: usize,
    window_size: usize,
    open_wait: Duration,
    half_open_trial_permits: usize,
    event_listeners: EventListeners<GatewayEvent>,
}

impl DependencyConfigBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_concurrency: 25,
            call_timeout: Duration::from_secs(1),
            failure_threshold: 0.5,
            min_samples: 10,
            window_size: 20,
            open_wait: Duration::from_secs(30),
            half_open_trial_permits: 1,
            event_listeners: EventListeners::new(),
        }
    }

    /// Maximum number of in-flight calls to this dependency.
    ///
    /// Default: 25
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// How long an admitted call may run before it is abandoned and recorded
    /// as a timeout.
    ///
    /// Default: 1s
    pub fn call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Failure ratio at or above which the breaker trips, in `(0, 1]`.
    ///
    /// Default: 0.5
    pub fn failure_threshold(mut self, failure_threshold: f64) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    /// Minimum recorded outcomes before the failure ratio is meaningful.
    ///
    /// Default: 10
    pub fn min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Capacity of the sliding outcome window.
    ///
    /// Default: 20
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// How long an open circuit refuses calls before probing recovery.
    ///
    /// Default: 30s
    pub fn open_wait(mut self, open_wait: Duration) -> Self {
        self.open_wait = open_wait;
        self
    }

    /// Number of concurrent trial calls admitted while half-open.
    ///
    /// Default: 1
    pub fn half_open_trial_permits(mut self, permits: usize) -> Self {
        self.half_open_trial_permits = permits;
        self
    }

    /// Registers a callback for every call that resolved to the fallback.
    ///
    /// The callback receives the classification label of the failure
    /// (`"admission_rejected"`, `"circuit_open"`, `"underlying_failure"`, or
    /// `"call_timeout"`).
    pub fn on_fallback_served<F>(mut self, f: F) -> Self
    where
        F: Fn(&'static str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let GatewayEvent::FallbackServed { reason, .. } = event {
                f(reason);
            }
        }));
        self
    }

    /// Registers a callback for every call that returned a real response.
    pub fn on_call_succeeded<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let GatewayEvent::CallSucceeded { elapsed, .. } = event {
                f(*elapsed);
            }
        }));
        self
    }

    /// Builds the configuration.
    ///
    /// Validation is deferred to [`RegistryBuilder::build`], where the whole
    /// registry either builds or fails before any call is made.
    ///
    /// [`RegistryBuilder::build`]: crate::RegistryBuilder::build
    pub fn build(self) -> DependencyConfig {
        DependencyConfig {
            name: self.name,
            max_concurrency: self.max_concurrency,
            call_timeout: self.call_timeout,
            failure_threshold: self.failure_threshold,
            min_samples: self.min_samples,
            window_size: self.window_size,
            open_wait: self.open_wait,
            half_open_trial_permits: self.half_open_trial_permits,
            event_listeners: self.event_listeners,
        }
    }
}
