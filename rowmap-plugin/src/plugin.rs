//! Wrapping proxy that routes calls through an interceptor.

use crate::{Interceptor, Invocation, Target};
use rowmap_core::RowMapResult;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Proxy exposing the wrapped target's operation surface.
///
/// Calls matching the interceptor's signature go to `intercept`; everything
/// else is forwarded untouched. Failures are never wrapped or translated here.
pub struct Plugin {
    target: Arc<dyn Target>,
    interceptor: Arc<dyn Interceptor>,
}

impl Plugin {
    /// Wrap `target` for `interceptor`, or return it unchanged when the
    /// interceptor's signature cannot apply to its type.
    pub fn wrap(target: Arc<dyn Target>, interceptor: Arc<dyn Interceptor>) -> Arc<dyn Target> {
        if !interceptor.signature().may_apply_to(target.target_type()) {
            return target;
        }
        tracing::trace!(
            interceptor = interceptor.name(),
            target = target.target_type(),
            "Wrapping target"
        );
        Arc::new(Plugin {
            target,
            interceptor,
        })
    }

    pub fn interceptor(&self) -> &Arc<dyn Interceptor> {
        &self.interceptor
    }
}

impl Target for Plugin {
    fn target_type(&self) -> &str {
        self.target.target_type()
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> RowMapResult<Value> {
        if !self
            .interceptor
            .signature()
            .matches(self.target.target_type(), operation)
        {
            return self.target.invoke(operation, args);
        }

        tracing::trace!(
            interceptor = self.interceptor.name(),
            target = self.target.target_type(),
            operation,
            "Intercepting call"
        );
        let invocation = Invocation::new(Arc::clone(&self.target), operation, args.to_vec());
        self.interceptor.intercept(invocation)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("target", &self.target.target_type())
            .field("interceptor", &self.interceptor.name())
            .finish()
    }
}
