//! The unified error taxonomy for guarded calls.
//!
//! The gateway never surfaces these errors to its caller; every variant
//! resolves to the dependency's fallback value. The taxonomy exists so each
//! refusal or failure can be classified for logging and metrics by the
//! surrounding service.

use std::time::Duration;
use thiserror::Error;

/// Classification of a guarded call that did not produce a real response.
///
/// # Type Parameters
///
/// - `E`: The error type of the underlying call capability
#[derive(Debug, Clone, Error)]
pub enum InvokeError<E> {
    /// The bulkhead was at capacity; the call was never attempted.
    #[error("admission rejected: {max_concurrency} calls already in flight")]
    AdmissionRejected {
        /// The configured concurrency ceiling that was hit.
        max_concurrency: usize,
    },

    /// The circuit breaker refused the call without attempting it.
    #[error("circuit open for dependency '{name}'")]
    CircuitOpen {
        /// Name of the dependency whose circuit is open.
        name: String,
    },

    /// The underlying call was attempted and returned an error.
    #[error("underlying call failed: {0}")]
    UnderlyingFailure(E),

    /// The underlying call exceeded the configured timeout and was abandoned.
    #[error("call exceeded timeout of {timeout:?}")]
    CallTimeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl<E> InvokeError<E> {
    /// Returns `true` if the bulkhead rejected the call.
    pub fn is_admission_rejected(&self) -> bool {
        matches!(self, InvokeError::AdmissionRejected { .. })
    }

    /// Returns `true` if the circuit breaker refused the call.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, InvokeError::CircuitOpen { .. })
    }

    /// Returns `true` if the underlying call errored.
    pub fn is_underlying_failure(&self) -> bool {
        matches!(self, InvokeError::UnderlyingFailure(_))
    }

    /// Returns `true` if the call timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InvokeError::CallTimeout { .. })
    }

    /// A short static label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeError::AdmissionRejected { .. } => "admission_rejected",
            InvokeError::CircuitOpen { .. } => "circuit_open",
            InvokeError::UnderlyingFailure(_) => "underlying_failure",
            InvokeError::CallTimeout { .. } => "call_timeout",
        }
    }

    /// Extracts the underlying error, if this is an `UnderlyingFailure`.
    pub fn into_underlying(self) -> Option<E> {
        match self {
            InvokeError::UnderlyingFailure(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the underlying error using a function.
    pub fn map_underlying<F, T>(self, f: F) -> InvokeError<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            InvokeError::AdmissionRejected { max_concurrency } => {
                InvokeError::AdmissionRejected { max_concurrency }
            }
            InvokeError::CircuitOpen { name } => InvokeError::CircuitOpen { name },
            InvokeError::UnderlyingFailure(e) => InvokeError::UnderlyingFailure(f(e)),
            InvokeError::CallTimeout { timeout } => InvokeError::CallTimeout { timeout },
        }
    }
}
