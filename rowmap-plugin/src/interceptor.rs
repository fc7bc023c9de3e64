//! The interceptor contract.

use crate::{Invocation, Properties, Signature, Target};
use rowmap_core::RowMapResult;
use serde_json::Value;
use std::sync::Arc;

/// A behavior attached to engine components without their knowledge.
///
/// # Lifecycle
///
/// 1. `set_properties` runs during chain assembly, while the interceptor is
///    still exclusively owned. `&mut self` keeps it out of reach once the
///    interceptor is shared.
/// 2. `plugin` is called for every engine component created; it returns the
///    component unchanged or wrapped in a proxy (usually via
///    [`Plugin::wrap`](crate::Plugin::wrap)).
/// 3. `intercept` runs on every call the proxy routes to it, on the caller's
///    thread. Not calling [`Invocation::proceed`] skips the rest of the chain
///    and the real operation.
///
/// Interceptors are shared across every proxy and call; state kept across
/// calls must be synchronized by the implementation.
///
/// # Example
///
/// ```rust,ignore
/// struct SlowQueryLog { signature: Signature, threshold_ms: u64 }
///
/// impl Interceptor for SlowQueryLog {
///     fn intercept(&self, invocation: Invocation) -> RowMapResult<Value> {
///         let started = Instant::now();
///         let result = invocation.proceed();
///         if started.elapsed().as_millis() as u64 > self.threshold_ms {
///             tracing::warn!(operation = invocation.operation(), "Slow query");
///         }
///         result
///     }
///
///     fn plugin(self: Arc<Self>, target: Arc<dyn Target>) -> Arc<dyn Target> {
///         Plugin::wrap(target, self)
///     }
///
///     fn signature(&self) -> &Signature { &self.signature }
/// }
/// ```
pub trait Interceptor: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handle a call routed to this interceptor.
    fn intercept(&self, invocation: Invocation) -> RowMapResult<Value>;

    /// Return `target` unchanged or wrapped so applicable calls reach
    /// [`intercept`](Self::intercept).
    fn plugin(self: Arc<Self>, target: Arc<dyn Target>) -> Arc<dyn Target>;

    /// Receive configuration. Repeated calls overwrite earlier values.
    fn set_properties(&mut self, properties: &Properties) -> RowMapResult<()> {
        let _ = properties;
        Ok(())
    }

    /// Calls this interceptor applies to.
    fn signature(&self) -> &Signature;
}
