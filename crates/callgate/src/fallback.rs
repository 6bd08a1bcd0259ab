//! Fallback values for guarded dependencies.

use std::fmt;
use std::sync::Arc;

/// Produces the substitute response when a guarded call cannot return a real
/// one.
///
/// The provider is a pure synchronous function of the request: no I/O, no
/// awaiting, no failure. It runs on every refusal, error, and timeout, so it
/// must stay cheap.
///
/// ```rust
/// use callgate::FallbackProvider;
///
/// // Echo the looked-up key into a placeholder record.
/// let provider: FallbackProvider<String, String> =
///     FallbackProvider::from_fn(|key: &String| format!("{key}: service unavailable"));
/// assert_eq!(provider.provide(&"lic-7".to_string()), "lic-7: service unavailable");
/// ```
pub struct FallbackProvider<Req, Res> {
    f: Arc<dyn Fn(&Req) -> Res + Send + Sync>,
}

impl<Req, Res> FallbackProvider<Req, Res> {
    /// Builds a provider from a function of the request.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Req) -> Res + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Builds a provider that always returns a clone of `value`, ignoring the
    /// request.
    pub fn fixed(value: Res) -> Self
    where
        Res: Clone + Send + Sync + 'static,
    {
        Self::from_fn(move |_| value.clone())
    }

    /// Produces the fallback value for `req`.
    pub fn provide(&self, req: &Req) -> Res {
        (self.f)(req)
    }
}

impl<Req, Res> Clone for FallbackProvider<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<Req, Res> fmt::Debug for FallbackProvider<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackProvider").finish_non_exhaustive()
    }
}
