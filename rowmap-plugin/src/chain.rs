//! Ordered interceptor chain.
//!
//! Interceptors wrap a target in registration order, so the first registered
//! ends up innermost:
//!
//! ```text
//! register A, then B
//!
//! caller ──▶ B.intercept ──proceed──▶ A.intercept ──proceed──▶ target
//!        ◀── result/failure ◀──────── result/failure ◀───────
//! ```
//!
//! The last registered interceptor sees every call first and the final
//! outcome last.

use crate::{Interceptor, Properties, Target};
use rowmap_core::{MapperSettings, PluginError, RowMapResult};
use std::fmt;
use std::sync::Arc;

/// Interceptors applied to every engine component, in registration order.
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
    max_interceptors: usize,
}

impl InterceptorChain {
    pub fn new(settings: &MapperSettings) -> Self {
        Self {
            interceptors: Vec::new(),
            max_interceptors: settings.max_interceptors,
        }
    }

    /// Register an interceptor that is already configured.
    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) -> RowMapResult<()> {
        if self.interceptors.len() >= self.max_interceptors {
            return Err(PluginError::ChainFull {
                limit: self.max_interceptors,
            }
            .into());
        }
        tracing::debug!(
            interceptor = interceptor.name(),
            position = self.interceptors.len(),
            "Registered interceptor"
        );
        self.interceptors.push(interceptor);
        Ok(())
    }

    /// Configure an interceptor with `properties`, then register it.
    pub fn add_configured<I: Interceptor>(
        &mut self,
        mut interceptor: I,
        properties: &Properties,
    ) -> RowMapResult<()> {
        interceptor.set_properties(properties)?;
        self.add_interceptor(Arc::new(interceptor))
    }

    /// Give every interceptor a chance to wrap `target`.
    pub fn plugin_all(&self, target: Arc<dyn Target>) -> Arc<dyn Target> {
        self.interceptors
            .iter()
            .fold(target, |target, interceptor| Arc::clone(interceptor).plugin(target))
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Default for InterceptorChain {
    fn default() -> Self {
        Self::new(&MapperSettings::default())
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field(
                "interceptors",
                &self.interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .field("max_interceptors", &self.max_interceptors)
            .finish()
    }
}
