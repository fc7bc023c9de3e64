//! rowmap Test Utilities
//!
//! Centralized test infrastructure for the rowmap workspace:
//! - Proptest generators for mapping entries and descriptors
//! - A scripted engine component and a recording interceptor for dispatch tests
//! - Tracing setup for tests

// Re-export core types for convenience
pub use rowmap_core::{
    Builder, Discriminator, MappingEntry, MappingError, PluginError, ResultDescriptor, ResultFlags,
    RowMapError, RowMapResult, TargetType,
};
pub use rowmap_plugin::{
    EngineComponent, Interceptor, InterceptorChain, Invocation, Plugin, Properties, Signature,
    Target,
};

use serde_json::Value;
use std::sync::{Arc, Mutex, Once};

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Install a fmt subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// CALL LOG
// ============================================================================

/// Shared, ordered record of who saw a call and when.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.into());
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

// ============================================================================
// SCRIPTED TARGET
// ============================================================================

/// Engine component stand-in that records calls and returns a fixed outcome.
pub struct ScriptedTarget {
    component: EngineComponent,
    outcome: RowMapResult<Value>,
    log: CallLog,
}

impl ScriptedTarget {
    pub fn returning(component: EngineComponent, value: Value, log: CallLog) -> Self {
        Self {
            component,
            outcome: Ok(value),
            log,
        }
    }

    pub fn failing(component: EngineComponent, reason: &str, log: CallLog) -> Self {
        Self {
            component,
            outcome: Err(PluginError::OperationFailed {
                target: component.as_str().to_string(),
                operation: "scripted".to_string(),
                reason: reason.to_string(),
            }
            .into()),
            log,
        }
    }
}

impl Target for ScriptedTarget {
    fn target_type(&self) -> &str {
        self.component.as_str()
    }

    fn invoke(&self, operation: &str, _args: &[Value]) -> RowMapResult<Value> {
        self.log.record(format!("target:{}", operation));
        self.outcome.clone()
    }
}

// ============================================================================
// RECORDING INTERCEPTOR
// ============================================================================

/// What a [`RecordingInterceptor`] does with a call.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Call `proceed` and return its outcome untouched
    Proceed,
    /// Never call `proceed`; return this value instead
    ShortCircuit(Value),
    /// Call `proceed` and wrap a successful result as `{ name: result }`
    WrapResult,
    /// Call `proceed` and turn any failure into this value
    Recover(Value),
}

/// Interceptor that logs `name:before` / `name:after` around each call.
pub struct RecordingInterceptor {
    name: String,
    behavior: Behavior,
    signature: Signature,
    log: CallLog,
}

impl RecordingInterceptor {
    pub fn new(name: &str, behavior: Behavior, signature: Signature, log: CallLog) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            signature,
            log,
        }
    }

    /// Applies to every operation on every target.
    pub fn everywhere(name: &str, behavior: Behavior, log: CallLog) -> Self {
        Self::new(name, behavior, Signature::predicate(|_, _| true), log)
    }
}

impl Interceptor for RecordingInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept(&self, invocation: Invocation) -> RowMapResult<Value> {
        self.log.record(format!("{}:before", self.name));
        let outcome = match &self.behavior {
            Behavior::Proceed => invocation.proceed(),
            Behavior::ShortCircuit(value) => Ok(value.clone()),
            Behavior::WrapResult => invocation.proceed().map(|v| {
                let mut wrapped = serde_json::Map::new();
                wrapped.insert(self.name.clone(), v);
                Value::Object(wrapped)
            }),
            Behavior::Recover(value) => invocation.proceed().or_else(|err| {
                tracing::debug!(interceptor = %self.name, error = %err, "Recovering from failure");
                Ok(value.clone())
            }),
        };
        self.log.record(format!("{}:after", self.name));
        outcome
    }

    fn plugin(self: Arc<Self>, target: Arc<dyn Target>) -> Arc<dyn Target> {
        Plugin::wrap(target, self)
    }

    fn set_properties(&mut self, properties: &Properties) -> RowMapResult<()> {
        if let Some(name) = properties.get("name") {
            self.name = name.to_string();
        }
        Ok(())
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating mapping metadata.

    use super::*;
    use proptest::prelude::*;

    /// Generate a column name, mixed case.
    pub fn arb_column() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_]{0,15}"
    }

    /// Generate a property name.
    pub fn arb_property() -> impl Strategy<Value = String> {
        "[a-z][a-zA-Z0-9]{0,11}"
    }

    /// Generate any combination of ID and CONSTRUCTOR.
    pub fn arb_flags() -> impl Strategy<Value = ResultFlags> {
        (0u8..4).prop_map(ResultFlags::from_bits_truncate)
    }

    /// Generate a plain column entry.
    pub fn arb_column_entry() -> impl Strategy<Value = MappingEntry> {
        (arb_property(), arb_column(), arb_flags()).prop_filter_map(
            "valid column entry",
            |(property, column, flags)| {
                MappingEntry::builder(property)
                    .column(column)
                    .flags(flags)
                    .build()
                    .ok()
            },
        )
    }

    /// Generate a composite-key entry backed by a nested query.
    pub fn arb_composite_entry() -> impl Strategy<Value = MappingEntry> {
        (
            arb_property(),
            prop::collection::vec((arb_property(), arb_column()), 1..4),
            arb_flags(),
        )
            .prop_filter_map("valid composite entry", |(property, parts, flags)| {
                MappingEntry::builder(property)
                    .composites(
                        parts
                            .into_iter()
                            .map(|(p, c)| MappingEntry::composite(p, c))
                            .collect(),
                    )
                    .nested_query("selectNested")
                    .flags(flags)
                    .build()
                    .ok()
            })
    }

    /// Generate an entry nesting another descriptor, optionally through a
    /// separate result set.
    pub fn arb_nested_entry() -> impl Strategy<Value = MappingEntry> {
        (arb_property(), arb_column(), any::<bool>()).prop_filter_map(
            "valid nested entry",
            |(property, column, separate_result_set)| {
                let builder = MappingEntry::builder(property).nested_result_map("nestedResult");
                let builder = if separate_result_set {
                    builder
                        .column(column.clone())
                        .foreign_column(column)
                        .result_set("children")
                } else {
                    builder
                };
                builder.build().ok()
            },
        )
    }

    /// Generate any kind of entry.
    pub fn arb_mapping_entry() -> impl Strategy<Value = MappingEntry> {
        prop_oneof![
            6 => arb_column_entry(),
            2 => arb_composite_entry(),
            1 => arb_nested_entry(),
        ]
    }

    /// Generate a list of entries.
    pub fn arb_mapping_entries(max: usize) -> impl Strategy<Value = Vec<MappingEntry>> {
        prop::collection::vec(arb_mapping_entry(), 0..max)
    }

    /// Generate a descriptor builder with a non-empty id.
    pub fn arb_builder() -> impl Strategy<Value = Builder> {
        (
            "[a-z][a-zA-Z]{0,11}Result",
            "[A-Z][a-zA-Z]{0,11}",
            arb_mapping_entries(12),
            prop::option::of(any::<bool>()),
        )
            .prop_map(|(id, ty, entries, auto_mapping)| {
                Builder::with_auto_mapping(id, TargetType::new(ty), entries, auto_mapping)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_log_keeps_order() {
        let log = CallLog::new();
        log.record("a");
        log.record("b");
        assert_eq!(log.events(), vec!["a", "b"]);
    }

    #[test]
    fn test_scripted_target_records_calls() {
        let log = CallLog::new();
        let target = ScriptedTarget::returning(EngineComponent::Executor, json!(7), log.clone());
        assert_eq!(target.invoke("query", &[]).unwrap(), json!(7));
        assert_eq!(log.events(), vec!["target:query"]);
    }

    #[test]
    fn test_recording_interceptor_takes_name_from_properties() {
        let mut interceptor =
            RecordingInterceptor::everywhere("original", Behavior::Proceed, CallLog::new());
        let props: Properties = [("name", "renamed")].into_iter().collect();
        interceptor.set_properties(&props).unwrap();
        assert_eq!(interceptor.name(), "renamed");
    }
}
