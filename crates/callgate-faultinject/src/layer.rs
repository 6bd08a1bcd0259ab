//! Tower layer for the fault-injection decorator.

use crate::config::FaultInjectConfig;
use crate::service::FaultInject;
#[cfg(feature = "metrics")]
use metrics::describe_counter;
#[cfg(feature = "metrics")]
use std::sync::Once;
use tower_layer::Layer;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A Tower layer that wraps a call capability with fault injection.
#[derive(Clone)]
pub struct FaultInjectLayer {
    config: FaultInjectConfig,
}

impl FaultInjectLayer {
    /// Creates a new layer from the given configuration.
    pub fn new(config: FaultInjectConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!("faultinject_delays_total", "Artificial delays injected");
        });

        Self { config }
    }

    /// Creates a new builder for configuring a fault-injection layer.
    pub fn builder() -> crate::config::FaultInjectConfigBuilder {
        crate::config::FaultInjectConfigBuilder::new()
    }
}

impl<S> Layer<S> for FaultInjectLayer {
    type Service = FaultInject<S>;

    fn layer(&self, service: S) -> Self::Service {
        FaultInject::new(service, self.config.clone())
    }
}
