//! Interceptable targets.

use rowmap_core::RowMapResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The operation surface of an engine component.
///
/// Anything that can be wrapped by an interceptor exposes its operations
/// through `invoke`, keyed by operation name. A proxy implements the same
/// trait, so callers cannot tell a wrapped target from the real one.
pub trait Target: Send + Sync {
    /// Type name used when matching interceptor signatures.
    fn target_type(&self) -> &str;

    /// Run `operation` with `args`.
    fn invoke(&self, operation: &str, args: &[Value]) -> RowMapResult<Value>;
}

/// Engine components that are wrapped by the interceptor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineComponent {
    /// Runs statements and manages the local cache
    Executor,
    /// Prepares statements
    StatementHandler,
    /// Binds parameters onto prepared statements
    ParameterHandler,
    /// Turns result sets into objects
    ResultSetHandler,
}

impl EngineComponent {
    pub const ALL: [EngineComponent; 4] = [
        EngineComponent::Executor,
        EngineComponent::StatementHandler,
        EngineComponent::ParameterHandler,
        EngineComponent::ResultSetHandler,
    ];

    /// Name used as [`Target::target_type`].
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineComponent::Executor => "Executor",
            EngineComponent::StatementHandler => "StatementHandler",
            EngineComponent::ParameterHandler => "ParameterHandler",
            EngineComponent::ResultSetHandler => "ResultSetHandler",
        }
    }
}

impl fmt::Display for EngineComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
