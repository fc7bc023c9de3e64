//! Which calls an interceptor applies to.
//!
//! A signature is a predicate over `(target type, operation)`. The common case
//! is a manifest listing operations per target type; arbitrary predicates are
//! supported for interceptors that decide dynamically.

use crate::EngineComponent;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

type SignaturePredicate = dyn Fn(&str, &str) -> bool + Send + Sync;

/// Injectable predicate deciding which operations an interceptor handles.
#[derive(Clone)]
pub enum Signature {
    /// Target type -> operations
    Manifest(HashMap<String, HashSet<String>>),
    /// Arbitrary predicate over (target type, operation)
    Predicate(Arc<SignaturePredicate>),
}

impl Signature {
    /// Empty manifest; matches nothing until operations are added.
    pub fn manifest() -> Self {
        Signature::Manifest(HashMap::new())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        Signature::Predicate(Arc::new(predicate))
    }

    /// Add `operation` on `target_type` to a manifest.
    ///
    /// Has no effect on predicate signatures.
    pub fn with(mut self, target_type: impl Into<String>, operation: impl Into<String>) -> Self {
        if let Signature::Manifest(manifest) = &mut self {
            manifest
                .entry(target_type.into())
                .or_default()
                .insert(operation.into());
        }
        self
    }

    /// Manifest shorthand for engine components.
    pub fn with_component(self, component: EngineComponent, operation: impl Into<String>) -> Self {
        self.with(component.as_str(), operation)
    }

    /// True when this signature covers `operation` on `target_type`.
    pub fn matches(&self, target_type: &str, operation: &str) -> bool {
        match self {
            Signature::Manifest(manifest) => manifest
                .get(target_type)
                .is_some_and(|operations| operations.contains(operation)),
            Signature::Predicate(predicate) => predicate(target_type, operation),
        }
    }

    /// True when some operation on `target_type` may match.
    ///
    /// Predicates cannot be inspected ahead of time, so they always may apply.
    pub fn may_apply_to(&self, target_type: &str) -> bool {
        match self {
            Signature::Manifest(manifest) => manifest.contains_key(target_type),
            Signature::Predicate(_) => true,
        }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Manifest(manifest) => f.debug_tuple("Manifest").field(manifest).finish(),
            Signature::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
