//! Fault injection for callgate services.
//!
//! This crate provides a Tower layer that delays a configurable fraction of
//! calls by a fixed duration before forwarding them. It exists to exercise a
//! gateway's timeout and circuit-breaking behavior under realistic slowness
//! without touching the dependency being called.
//!
//! Selection is randomized per call. With a seeded RNG the sequence of
//! delayed calls is reproducible, which keeps tests deterministic.
//!
//! # Example
//!
//! ```rust
//! use callgate_faultinject::FaultInjectLayer;
//! use std::time::Duration;
//! use tower::ServiceBuilder;
//!
//! # fn make_service() -> impl tower::Service<u32, Response = u32, Error = std::convert::Infallible> + Clone {
//! #     tower::service_fn(|req: u32| async move { Ok::<_, std::convert::Infallible>(req) })
//! # }
//! // Delay one call in three by five seconds.
//! let service = ServiceBuilder::new()
//!     .layer(
//!         FaultInjectLayer::builder()
//!             .name("license-service")
//!             .rate(1.0 / 3.0)
//!             .delay(Duration::from_secs(5))
//!             .build(),
//!     )
//!     .service(make_service());
//! ```
//!
//! A rate of `0.0` (the default) makes the layer inert: calls are forwarded
//! without consulting the RNG or emitting events.

mod config;
mod events;
mod layer;
mod service;

pub use config::{FaultInjectConfig, FaultInjectConfigBuilder};
pub use events::FaultInjectEvent;
pub use layer::FaultInjectLayer;
pub use service::FaultInject;
