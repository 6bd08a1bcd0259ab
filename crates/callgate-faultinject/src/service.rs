//! Fault-injection service implementation.

use crate::config::FaultInjectConfig;
use crate::events::FaultInjectEvent;
use futures::future::BoxFuture;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Instant;
use tower_service::Service;

/// A Tower service that delays a configured fraction of calls before
/// forwarding them to the inner call capability.
///
/// The delay runs inside the decorated call path, so anything holding
/// resources for the duration of the call (the gateway's bulkhead slot in
/// particular) keeps holding them through the injected delay, the same
/// contract a genuinely slow dependency would impose.
#[derive(Clone)]
pub struct FaultInject<S> {
    inner: S,
    config: Arc<FaultInjectConfig>,
    rng: Arc<Mutex<StdRng>>,
}

impl<S> FaultInject<S> {
    /// Creates a new fault-injection service.
    pub(crate) fn new(inner: S, config: FaultInjectConfig) -> Self {
        let rng = config.create_rng();
        Self {
            inner,
            config: Arc::new(config),
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

impl<S, Req> Service<Req> for FaultInject<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: Send + 'static,
    Req: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let mut inner = self.inner.clone();
        let config = Arc::clone(&self.config);
        let rng = Arc::clone(&self.rng);

        Box::pin(async move {
            // Inert when disabled: no RNG lock, no events.
            if !config.enabled() {
                return inner.call(req).await;
            }

            let inject = {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                rng.random::<f64>() < config.rate
            };

            if inject {
                config
                    .event_listeners
                    .emit(&FaultInjectEvent::DelayInjected {
                        dependency: config.name.clone(),
                        timestamp: Instant::now(),
                        delay: config.delay,
                    });

                #[cfg(feature = "tracing")]
                tracing::warn!(
                    dependency = %config.name,
                    delay_ms = config.delay.as_millis() as u64,
                    "fault injection: delaying call"
                );

                #[cfg(feature = "metrics")]
                metrics::counter!("faultinject_delays_total", "dependency" => config.name.clone())
                    .increment(1);

                tokio::time::sleep(config.delay).await;
            } else {
                config
                    .event_listeners
                    .emit(&FaultInjectEvent::PassedThrough {
                        dependency: config.name.clone(),
                        timestamp: Instant::now(),
                    });
            }

            inner.call(req).await
        })
    }
}
