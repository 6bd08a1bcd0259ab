//! Errors surfaced by the gateway itself.
//!
//! There are only two: a dependency name that was never registered, and a
//! configuration the registry refuses to build. Everything that can go wrong
//! during a guarded call resolves to the fallback and never reaches the
//! caller as an error.

use thiserror::Error;

/// The requested dependency name was never registered.
///
/// This is the only error [`invoke`](crate::Registry::invoke) can return, and
/// it is always a programming error in the calling service, never a runtime
/// condition of the dependency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no dependency registered under '{name}'")]
pub struct UnknownDependency {
    /// The name that was looked up.
    pub name: String,
}

/// A dependency configuration the registry refuses to build.
///
/// All validation happens in [`RegistryBuilder::build`]; a registry that
/// builds successfully never needs to re-check these at call time.
///
/// [`RegistryBuilder::build`]: crate::RegistryBuilder::build
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `max_concurrency` was zero; every call would be rejected.
    #[error("dependency '{name}': max_concurrency must be at least 1")]
    ZeroConcurrency {
        /// Name of the offending dependency.
        name: String,
    },

    /// `window_size` was zero; the breaker could never observe an outcome.
    #[error("dependency '{name}': window_size must be at least 1")]
    ZeroWindowSize {
        /// Name of the offending dependency.
        name: String,
    },

    /// `half_open_trial_permits` was zero; an open circuit could never probe
    /// recovery.
    #[error("dependency '{name}': half_open_trial_permits must be at least 1")]
    ZeroTrialPermits {
        /// Name of the offending dependency.
        name: String,
    },

    /// `failure_threshold` was outside `(0, 1]`.
    #[error("dependency '{name}': failure_threshold {value} is outside (0, 1]")]
    ThresholdOutOfRange {
        /// Name of the offending dependency.
        name: String,
        /// The rejected threshold.
        value: f64,
    },

    /// `min_samples` exceeded `window_size`; the sample floor could never be
    /// met.
    #[error("dependency '{name}': min_samples {min_samples} exceeds window_size {window_size}")]
    MinSamplesExceedsWindow {
        /// Name of the offending dependency.
        name: String,
        /// The configured sample floor.
        min_samples: usize,
        /// The configured window capacity.
        window_size: usize,
    },

    /// Two dependencies were registered under the same name.
    #[error("dependency '{name}' registered twice")]
    DuplicateDependency {
        /// The name registered more than once.
        name: String,
    },
}
