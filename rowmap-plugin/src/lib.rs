//! rowmap Plugin - Interceptor Contract
//!
//! Lets external behaviors observe and control calls into engine components
//! (statement preparation, parameter binding, result-set handling, execution)
//! without those components knowing about them.
//!
//! # Architecture
//!
//! ```text
//! InterceptorChain::plugin_all(component)
//!     └─▶ Interceptor::plugin ──▶ Plugin::wrap ──▶ proxy (same Target surface)
//!
//! proxy.invoke(op, args)
//!     ├─ signature matches ──▶ Interceptor::intercept(Invocation)
//!     │                            └─▶ Invocation::proceed ──▶ next layer
//!     └─ otherwise ──────────▶ next layer
//! ```
//!
//! Dispatch is synchronous: every layer runs on the caller's thread, and
//! failures cross layers unchanged unless an interceptor replaces them.

mod chain;
mod interceptor;
mod invocation;
mod plugin;
mod properties;
mod signature;
mod target;

pub use chain::InterceptorChain;
pub use interceptor::Interceptor;
pub use invocation::Invocation;
pub use plugin::Plugin;
pub use properties::Properties;
pub use signature::Signature;
pub use target::{EngineComponent, Target};

// Re-export core types for convenience
pub use rowmap_core::{MapperSettings, PluginError, RowMapError, RowMapResult};
