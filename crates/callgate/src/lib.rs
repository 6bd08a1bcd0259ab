//! A resilient-call gateway for named service dependencies.
//!
//! Services in a CRUD mesh call each other synchronously; any one of those
//! remote dependencies can slow down, error, or disappear. This crate wraps
//! each dependency behind a guarded pipeline so the calling service degrades
//! instead of failing:
//!
//! 1. **Bulkhead** ([`callgate_bulkhead`]): a hard cap on in-flight calls per
//!    dependency, non-blocking admission.
//! 2. **Circuit breaker** ([`callgate_breaker`]): a sliding window of call
//!    outcomes trips the circuit when the dependency looks unhealthy.
//! 3. **Timeout**: admitted calls are abandoned after a configured duration
//!    and recorded as timeouts.
//! 4. **Fallback**: every refusal, error, and timeout resolves to a
//!    per-dependency substitute value, so [`Registry::invoke`] always
//!    answers.
//!
//! ```rust
//! use callgate::{DependencyConfig, FallbackProvider, Registry};
//! use std::time::Duration;
//! use tower::service_fn;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry: Registry<String, String, std::convert::Infallible> = Registry::builder()
//!     .dependency(
//!         DependencyConfig::builder("license-service")
//!             .max_concurrency(2)
//!             .call_timeout(Duration::from_secs(1))
//!             .failure_threshold(0.5)
//!             .min_samples(4)
//!             .window_size(4)
//!             .open_wait(Duration::from_secs(5))
//!             .build(),
//!         service_fn(|key: String| async move { Ok(format!("license record for {key}")) }),
//!         FallbackProvider::from_fn(|key: &String| {
//!             format!("{key}: license service unavailable")
//!         }),
//!     )
//!     .build()
//!     .unwrap();
//!
//! // Real response or fallback; never an error for a registered name.
//! let record = registry.invoke("license-service", "lic-42".to_string()).await.unwrap();
//! # let _ = record;
//! # }
//! ```

mod config;
mod error;
mod events;
mod fallback;
mod registry;

pub use config::{DependencyConfig, DependencyConfigBuilder};
pub use error::{ConfigError, UnknownDependency};
pub use events::GatewayEvent;
pub use fallback::FallbackProvider;
pub use registry::{Registry, RegistryBuilder};

pub use callgate_breaker::{BreakerMetrics, BreakerState, CallOutcome};
pub use callgate_core::InvokeError;
