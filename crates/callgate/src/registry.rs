//! The dependency registry and the guarded `invoke` pipeline.

use crate::config::DependencyConfig;
use crate::error::{ConfigError, UnknownDependency};
use crate::events::GatewayEvent;
use crate::fallback::FallbackProvider;
use callgate_breaker::{BreakerConfig, BreakerMetrics, BreakerState, CallOutcome, CircuitBreaker};
use callgate_bulkhead::{Bulkhead, BulkheadConfig};
use callgate_core::InvokeError;
#[cfg(feature = "metrics")]
use metrics::{describe_counter, describe_histogram};
use std::collections::HashMap;
#[cfg(feature = "metrics")]
use std::sync::Once;
use std::time::Instant;
use tower::util::BoxCloneSyncService;
use tower::ServiceExt;
use tower_service::Service;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// One registered dependency: its guards, its call capability, its fallback.
struct Dependency<Req, Res, E> {
    config: DependencyConfig,
    breaker: CircuitBreaker,
    bulkhead: Bulkhead,
    service: BoxCloneSyncService<Req, Res, E>,
    fallback: FallbackProvider<Req, Res>,
}

impl<Req, Res, E> Clone for Dependency<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            breaker: self.breaker.clone(),
            bulkhead: self.bulkhead.clone(),
            service: self.service.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

/// Records exactly one outcome per admitted call.
///
/// The armed guard records `Timeout` on drop, which covers the call future
/// being abandoned mid-flight by caller cancellation. The normal completion
/// paths disarm it by recording explicitly.
struct OutcomeGuard {
    breaker: CircuitBreaker,
    armed: bool,
}

impl OutcomeGuard {
    fn new(breaker: CircuitBreaker) -> Self {
        Self {
            breaker,
            armed: true,
        }
    }

    fn complete(mut self, outcome: CallOutcome) {
        self.armed = false;
        self.breaker.on_result(outcome);
    }
}

impl Drop for OutcomeGuard {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.on_result(CallOutcome::Timeout);
        }
    }
}

/// Builder for a [`Registry`]; all dependencies are declared up front.
pub struct RegistryBuilder<Req, Res, E> {
    pending: Vec<Dependency<Req, Res, E>>,
}

impl<Req, Res, E> RegistryBuilder<Req, Res, E>
where
    Req: Send + 'static,
    Res: Send + 'static,
    E: Send + 'static,
{
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Declares a dependency: its configuration, its call capability, and the
    /// fallback that answers when the call cannot.
    ///
    /// The fallback is a required argument rather than a setter, so a
    /// dependency without one cannot be expressed.
    pub fn dependency<S>(
        mut self,
        config: DependencyConfig,
        service: S,
        fallback: FallbackProvider<Req, Res>,
    ) -> Self
    where
        S: Service<Req, Response = Res, Error = E> + Clone + Send + Sync + 'static,
        S::Future: Send + 'static,
    {
        let breaker = CircuitBreaker::new(
            BreakerConfig::builder()
                .name(config.name.clone())
                .failure_threshold(config.failure_threshold)
                .min_samples(config.min_samples)
                .window_size(config.window_size)
                .open_wait(config.open_wait)
                .half_open_trial_permits(config.half_open_trial_permits)
                .build(),
        );
        let bulkhead = Bulkhead::new(
            BulkheadConfig::builder()
                .name(config.name.clone())
                .max_concurrency(config.max_concurrency)
                .build(),
        );
        self.pending.push(Dependency {
            config,
            breaker,
            bulkhead,
            service: BoxCloneSyncService::new(service),
            fallback,
        });
        self
    }

    /// Validates every declared dependency and builds the registry.
    ///
    /// Fails on the first invalid configuration or duplicated name; a
    /// registry that builds never re-validates at call time.
    pub fn build(self) -> Result<Registry<Req, Res, E>, ConfigError> {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "gateway_calls_total",
                "Guarded calls, by dependency and resolution"
            );
            describe_histogram!(
                "gateway_call_duration_seconds",
                "Wall time of successful guarded calls"
            );
        });

        let mut dependencies = HashMap::with_capacity(self.pending.len());
        for dep in self.pending {
            dep.config.validate()?;
            let name = dep.config.name.clone();
            if dependencies.insert(name.clone(), dep).is_some() {
                return Err(ConfigError::DuplicateDependency { name });
            }
        }
        Ok(Registry { dependencies })
    }
}

impl<Req, Res, E> Default for RegistryBuilder<Req, Res, E>
where
    Req: Send + 'static,
    Res: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The resilient-call gateway: a fixed set of named dependencies, each
/// guarded by a bulkhead, a circuit breaker, and a call timeout, each backed
/// by a fallback.
///
/// Cloning is cheap in the parts that matter: clones share breaker state and
/// bulkhead slots, so the registry can be handed to many tasks (or wrapped in
/// an `Arc`, it is `Sync`).
pub struct Registry<Req, Res, E> {
    dependencies: HashMap<String, Dependency<Req, Res, E>>,
}

impl<Req, Res, E> Clone for Registry<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            dependencies: self.dependencies.clone(),
        }
    }
}

impl<Req, Res, E> Registry<Req, Res, E>
where
    Req: Clone + Send + 'static,
    Res: Send + 'static,
    E: Send + 'static,
{
    /// Creates a builder.
    pub fn builder() -> RegistryBuilder<Req, Res, E> {
        RegistryBuilder::new()
    }

    /// Performs a guarded call to the named dependency.
    ///
    /// For a registered name this never surfaces a call failure: the returned
    /// value is either the dependency's real response or its fallback value.
    /// The only error is an unregistered name, which is a bug in the caller
    /// rather than a condition of the dependency.
    ///
    /// Resolution order: bulkhead admission, breaker admission, the
    /// underlying call under the configured timeout. Whichever stage refuses
    /// or fails, the fallback answers; an admitted call records exactly one
    /// outcome and holds its bulkhead slot until it completes or is
    /// abandoned.
    pub async fn invoke(&self, name: &str, req: Req) -> Result<Res, UnknownDependency> {
        let dep = self
            .dependencies
            .get(name)
            .ok_or_else(|| UnknownDependency {
                name: name.to_string(),
            })?;

        let started = Instant::now();
        let fallback_req = req.clone();
        match guarded_call(dep, req).await {
            Ok(res) => {
                let elapsed = started.elapsed();
                dep.config
                    .event_listeners
                    .emit(&GatewayEvent::CallSucceeded {
                        dependency: dep.config.name.clone(),
                        timestamp: Instant::now(),
                        elapsed,
                    });

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    dependency = %dep.config.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "guarded call succeeded"
                );

                #[cfg(feature = "metrics")]
                {
                    metrics::counter!("gateway_calls_total",
                        "dependency" => dep.config.name.clone(),
                        "resolution" => "success")
                    .increment(1);
                    metrics::histogram!("gateway_call_duration_seconds",
                        "dependency" => dep.config.name.clone())
                    .record(elapsed.as_secs_f64());
                }

                Ok(res)
            }
            Err(err) => {
                let reason = err.kind();
                dep.config
                    .event_listeners
                    .emit(&GatewayEvent::FallbackServed {
                        dependency: dep.config.name.clone(),
                        timestamp: Instant::now(),
                        reason,
                    });

                #[cfg(feature = "tracing")]
                tracing::warn!(
                    dependency = %dep.config.name,
                    reason,
                    "serving fallback"
                );

                #[cfg(feature = "metrics")]
                metrics::counter!("gateway_calls_total",
                    "dependency" => dep.config.name.clone(),
                    "resolution" => reason)
                .increment(1);

                Ok(dep.fallback.provide(&fallback_req))
            }
        }
    }

    /// Names of all registered dependencies.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Current breaker state for the named dependency.
    pub fn breaker_state(&self, name: &str) -> Result<BreakerState, UnknownDependency> {
        Ok(self.lookup(name)?.breaker.state())
    }

    /// Snapshot of the named dependency's breaker counters.
    pub fn breaker_metrics(&self, name: &str) -> Result<BreakerMetrics, UnknownDependency> {
        Ok(self.lookup(name)?.breaker.metrics())
    }

    /// Number of calls currently in flight to the named dependency.
    pub fn in_flight(&self, name: &str) -> Result<usize, UnknownDependency> {
        Ok(self.lookup(name)?.bulkhead.in_flight())
    }

    /// Forces the named dependency's circuit open.
    pub fn force_open(&self, name: &str) -> Result<(), UnknownDependency> {
        self.lookup(name)?.breaker.force_open();
        Ok(())
    }

    /// Resets the named dependency's circuit to Closed with an empty window.
    pub fn reset(&self, name: &str) -> Result<(), UnknownDependency> {
        self.lookup(name)?.breaker.reset();
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<&Dependency<Req, Res, E>, UnknownDependency> {
        self.dependencies.get(name).ok_or_else(|| UnknownDependency {
            name: name.to_string(),
        })
    }
}

/// The pipeline for one admitted (or refused) call.
///
/// The permit is held across the whole call, injected delays included, and
/// released by drop on every exit path. The outcome guard mirrors that for
/// the breaker: exactly one recorded outcome per admission.
async fn guarded_call<Req, Res, E>(
    dep: &Dependency<Req, Res, E>,
    req: Req,
) -> Result<Res, InvokeError<E>>
where
    Req: Send + 'static,
    Res: Send + 'static,
    E: Send + 'static,
{
    let _permit = dep
        .bulkhead
        .try_admit()
        .ok_or(InvokeError::AdmissionRejected {
            max_concurrency: dep.bulkhead.max_concurrency(),
        })?;

    if !dep.breaker.try_call() {
        return Err(InvokeError::CircuitOpen {
            name: dep.config.name.clone(),
        });
    }

    let guard = OutcomeGuard::new(dep.breaker.clone());
    let service = dep.service.clone();
    let timeout = dep.config.call_timeout;

    match tokio::time::timeout(timeout, service.oneshot(req)).await {
        Ok(Ok(res)) => {
            guard.complete(CallOutcome::Success);
            Ok(res)
        }
        Ok(Err(e)) => {
            guard.complete(CallOutcome::Failure);
            Err(InvokeError::UnderlyingFailure(e))
        }
        // The slow call future is dropped here, so the slot frees now even
        // though the remote side may still be working.
        Err(_elapsed) => {
            guard.complete(CallOutcome::Timeout);
            Err(InvokeError::CallTimeout { timeout })
        }
    }
}
