//! The data carried into every `intercept` call.

use crate::Target;
use rowmap_core::RowMapResult;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One intercepted call: target, operation and arguments.
///
/// Lives for the duration of a single call. [`proceed`](Self::proceed) is the
/// only way to reach the next layer, which is either another interceptor or
/// the real target.
pub struct Invocation {
    target: Arc<dyn Target>,
    operation: String,
    args: Vec<Value>,
}

impl Invocation {
    pub fn new(target: Arc<dyn Target>, operation: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            target,
            operation: operation.into(),
            args,
        }
    }

    pub fn target(&self) -> &Arc<dyn Target> {
        &self.target
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Invoke the next layer with the original arguments.
    ///
    /// Its result or failure is returned unchanged.
    pub fn proceed(&self) -> RowMapResult<Value> {
        self.target.invoke(&self.operation, &self.args)
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("target", &self.target.target_type())
            .field("operation", &self.operation)
            .field("args", &self.args)
            .finish()
    }
}
