//! Configuration for the fault-injection decorator.

use crate::events::FaultInjectEvent;
use callgate_core::events::{EventListeners, FnListener};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Configuration for a fault injector instance.
#[derive(Clone)]
pub struct FaultInjectConfig {
    /// Name of the decorated dependency.
    pub(crate) name: String,
    /// Probability of delaying a call, in `[0, 1]`. Zero disables injection.
    pub(crate) rate: f64,
    /// The fixed delay applied to selected calls.
    pub(crate) delay: Duration,
    /// Optional seed for deterministic injection in tests.
    pub(crate) seed: Option<u64>,
    /// Event listeners.
    pub(crate) event_listeners: EventListeners<FaultInjectEvent>,
}

impl FaultInjectConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> FaultInjectConfigBuilder {
        FaultInjectConfigBuilder::new()
    }

    /// Returns `true` when injection can ever fire.
    pub fn enabled(&self) -> bool {
        self.rate > 0.0
    }

    pub(crate) fn create_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Builder for [`FaultInjectConfig`].
pub struct FaultInjectConfigBuilder {
    name: String,
    rate: f64,
    delay: Duration,
    seed: Option<u64>,
    event_listeners: EventListeners<FaultInjectEvent>,
}

impl FaultInjectConfigBuilder {
    /// Creates a builder with injection disabled (`rate = 0.0`).
    pub fn new() -> Self {
        Self {
            name: "faultinject".to_string(),
            rate: 0.0,
            delay: Duration::from_secs(5),
            seed: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the dependency name used in events and logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the fraction of calls to delay, clamped to `[0, 1]`.
    ///
    /// Default: 0.0 (disabled)
    ///
    /// # Example
    /// ```rust
    /// use callgate_faultinject::FaultInjectConfig;
    ///
    /// // Delay roughly one call in three.
    /// let layer = FaultInjectConfig::builder().rate(1.0 / 3.0).build();
    /// ```
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the fixed delay applied to selected calls.
    ///
    /// To exercise the timeout path this should exceed the gateway's call
    /// timeout for the decorated dependency.
    ///
    /// Default: 5s
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Seeds the RNG for deterministic injection.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Registers a callback for each injected delay.
    pub fn on_delay_injected<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FaultInjectEvent::DelayInjected { delay, .. } = event {
                f(*delay);
            }
        }));
        self
    }

    /// Registers a callback for each call forwarded untouched.
    pub fn on_passed_through<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if matches!(event, FaultInjectEvent::PassedThrough { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the configuration and returns a [`FaultInjectLayer`].
    ///
    /// [`FaultInjectLayer`]: crate::FaultInjectLayer
    pub fn build(self) -> crate::layer::FaultInjectLayer {
        let config = FaultInjectConfig {
            name: self.name,
            rate: self.rate,
            delay: self.delay,
            seed: self.seed,
            event_listeners: self.event_listeners,
        };
        crate::layer::FaultInjectLayer::new(config)
    }
}

impl Default for FaultInjectConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
