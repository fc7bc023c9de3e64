//! Result descriptors: how one row of query output becomes one object.
//!
//! A [`ResultDescriptor`] is an immutable, indexed view over an ordered list of
//! [`MappingEntry`] values. The only way to obtain one is through [`Builder`],
//! which classifies every entry in a single pass:
//!
//! ```text
//! mappings ──▶ Builder::build() ──┬─▶ id_mappings          (ID, or all when none)
//!                                 ├─▶ constructor_mappings (CONSTRUCTOR)
//!                                 ├─▶ property_mappings    (not CONSTRUCTOR)
//!                                 ├─▶ mapped_columns       (upper-cased)
//!                                 └─▶ nested result map / nested query flags
//! ```
//!
//! Descriptors are built once during configuration assembly and then shared
//! read-only (typically behind `Arc`) by every row materialization.

use crate::{Discriminator, MappingEntry, MappingError, ResultFlags, RowMapResult, TargetType};
use std::collections::HashSet;
use std::sync::Arc;

/// Normalize a column name for membership tests against
/// [`ResultDescriptor::mapped_columns`].
///
/// Upper-casing is locale-independent; every caller comparing column names
/// against a descriptor must go through this function.
pub fn normalize_column(column: &str) -> String {
    column.to_uppercase()
}

// ============================================================================
// RESULT DESCRIPTOR
// ============================================================================

/// Immutable, validated mapping from a result row to a target type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDescriptor {
    id: String,
    target_type: TargetType,
    mappings: Vec<MappingEntry>,
    id_mappings: Vec<MappingEntry>,
    constructor_mappings: Vec<MappingEntry>,
    property_mappings: Vec<MappingEntry>,
    mapped_columns: HashSet<String>,
    discriminator: Option<Arc<Discriminator>>,
    has_nested_result_maps: bool,
    has_nested_queries: bool,
    auto_mapping: Option<bool>,
}

impl ResultDescriptor {
    /// Start building a descriptor.
    pub fn builder(
        id: impl Into<String>,
        target_type: TargetType,
        mappings: Vec<MappingEntry>,
    ) -> Builder {
        Builder::new(id, target_type, mappings)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_type(&self) -> &TargetType {
        &self.target_type
    }

    /// Every entry as supplied, in declaration order.
    pub fn mappings(&self) -> &[MappingEntry] {
        &self.mappings
    }

    /// Identity entries. Falls back to all of `mappings` when no entry is
    /// flagged `ID`.
    pub fn id_mappings(&self) -> &[MappingEntry] {
        &self.id_mappings
    }

    /// Constructor arguments, in argument order.
    pub fn constructor_mappings(&self) -> &[MappingEntry] {
        &self.constructor_mappings
    }

    /// Settable properties (may also carry `ID`).
    pub fn property_mappings(&self) -> &[MappingEntry] {
        &self.property_mappings
    }

    /// Upper-cased names of every explicitly mapped column.
    pub fn mapped_columns(&self) -> &HashSet<String> {
        &self.mapped_columns
    }

    /// Case-insensitive check for an explicitly mapped column.
    pub fn is_mapped_column(&self, column: &str) -> bool {
        self.mapped_columns.contains(&normalize_column(column))
    }

    pub fn discriminator(&self) -> Option<&Arc<Discriminator>> {
        self.discriminator.as_ref()
    }

    pub fn has_nested_result_maps(&self) -> bool {
        self.has_nested_result_maps
    }

    pub fn has_nested_queries(&self) -> bool {
        self.has_nested_queries
    }

    /// Tri-state auto-mapping flag. `None` defers to the process-wide default.
    pub fn auto_mapping(&self) -> Option<bool> {
        self.auto_mapping
    }

    /// Mark this descriptor as having nested result maps regardless of its
    /// own entries.
    ///
    /// Only callable while the descriptor is still exclusively owned, i.e.
    /// during configuration assembly and before it is shared.
    pub fn force_nested_result_maps(&mut self) {
        self.has_nested_result_maps = true;
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`ResultDescriptor`].
///
/// Performs no validation of the entries themselves; the only failure is a
/// missing id.
#[derive(Debug, Clone)]
pub struct Builder {
    id: String,
    target_type: TargetType,
    mappings: Vec<MappingEntry>,
    auto_mapping: Option<bool>,
    discriminator: Option<Arc<Discriminator>>,
}

impl Builder {
    pub fn new(id: impl Into<String>, target_type: TargetType, mappings: Vec<MappingEntry>) -> Self {
        Self::with_auto_mapping(id, target_type, mappings, None)
    }

    pub fn with_auto_mapping(
        id: impl Into<String>,
        target_type: TargetType,
        mappings: Vec<MappingEntry>,
        auto_mapping: Option<bool>,
    ) -> Self {
        Self {
            id: id.into(),
            target_type,
            mappings,
            auto_mapping,
            discriminator: None,
        }
    }

    /// Attach a discriminator.
    pub fn discriminator(mut self, discriminator: Arc<Discriminator>) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// The type the finished descriptor will materialize into.
    pub fn target_type(&self) -> &TargetType {
        &self.target_type
    }

    /// Classify every entry and produce the descriptor.
    ///
    /// Deterministic: building twice from the same state yields equal
    /// descriptors.
    pub fn build(&self) -> RowMapResult<ResultDescriptor> {
        if self.id.is_empty() {
            return Err(MappingError::MissingDescriptorId.into());
        }

        let mut mapped_columns = HashSet::new();
        let mut id_mappings = Vec::new();
        let mut constructor_mappings = Vec::new();
        let mut property_mappings = Vec::new();
        let mut has_nested_queries = false;
        let mut has_nested_result_maps = false;

        for entry in &self.mappings {
            has_nested_queries |= entry.nested_query_id().is_some();
            // Entries with a result set are multi-result-set joins, not in-row nesting
            has_nested_result_maps |=
                entry.nested_result_map_id().is_some() && entry.result_set().is_none();

            if let Some(column) = entry.column() {
                mapped_columns.insert(normalize_column(column));
            } else if entry.is_composite() {
                for composite in entry.composites() {
                    if let Some(column) = composite.column() {
                        mapped_columns.insert(normalize_column(column));
                    }
                }
            }

            if entry.has_flag(ResultFlags::CONSTRUCTOR) {
                constructor_mappings.push(entry.clone());
            } else {
                property_mappings.push(entry.clone());
            }
            if entry.has_flag(ResultFlags::ID) {
                id_mappings.push(entry.clone());
            }
        }

        if id_mappings.is_empty() {
            id_mappings = self.mappings.clone();
        }

        tracing::debug!(
            id = %self.id,
            target_type = %self.target_type,
            mappings = self.mappings.len(),
            id_mappings = id_mappings.len(),
            constructor_mappings = constructor_mappings.len(),
            property_mappings = property_mappings.len(),
            has_nested_result_maps,
            has_nested_queries,
            "Built result descriptor"
        );

        Ok(ResultDescriptor {
            id: self.id.clone(),
            target_type: self.target_type.clone(),
            mappings: self.mappings.clone(),
            id_mappings,
            constructor_mappings,
            property_mappings,
            mapped_columns,
            discriminator: self.discriminator.clone(),
            has_nested_result_maps,
            has_nested_queries,
            auto_mapping: self.auto_mapping,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RowMapError;
    use std::collections::HashMap;

    fn user_type() -> TargetType {
        TargetType::new("User")
    }

    fn column(property: &str, column: &str) -> MappingEntry {
        MappingEntry::builder(property).column(column).build().unwrap()
    }

    fn id_column(property: &str, column: &str) -> MappingEntry {
        MappingEntry::builder(property).column(column).id().build().unwrap()
    }

    fn columns(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_id_and_property_classification() {
        let id = id_column("id", "id");
        let name = column("name", "name");
        let rd = ResultDescriptor::builder("userResult", user_type(), vec![id.clone(), name.clone()])
            .build()
            .unwrap();

        assert_eq!(rd.id_mappings(), &[id.clone()]);
        assert_eq!(rd.property_mappings(), &[id, name]);
        assert!(rd.constructor_mappings().is_empty());
        assert_eq!(rd.mapped_columns(), &columns(&["ID", "NAME"]));
    }

    #[test]
    fn test_id_mappings_fall_back_to_all_mappings() {
        let name = column("name", "name");
        let rd = ResultDescriptor::builder("userResult", user_type(), vec![name.clone()])
            .build()
            .unwrap();
        assert_eq!(rd.id_mappings(), &[name]);
    }

    #[test]
    fn test_constructor_id_entry_is_not_a_property() {
        let id = MappingEntry::unnamed()
            .column("id")
            .constructor()
            .id()
            .build()
            .unwrap();
        let rd = ResultDescriptor::builder("userResult", user_type(), vec![id.clone()])
            .build()
            .unwrap();

        assert_eq!(rd.id_mappings(), &[id.clone()]);
        assert_eq!(rd.constructor_mappings(), &[id]);
        assert!(rd.property_mappings().is_empty());
    }

    #[test]
    fn test_empty_id_fails() {
        let builder = ResultDescriptor::builder("", user_type(), vec![column("name", "name")]);
        let result = builder.build();
        assert!(matches!(
            result,
            Err(RowMapError::Mapping(MappingError::MissingDescriptorId))
        ));
    }

    #[test]
    fn test_empty_mappings_are_allowed() {
        let rd = ResultDescriptor::builder("emptyResult", user_type(), vec![])
            .build()
            .unwrap();
        assert!(rd.mappings().is_empty());
        assert!(rd.id_mappings().is_empty());
        assert!(rd.mapped_columns().is_empty());
    }

    #[test]
    fn test_composite_columns_are_mapped() {
        let orders = MappingEntry::builder("orders")
            .composites(vec![
                MappingEntry::composite("tenantId", "tenant_id"),
                MappingEntry::composite("userId", "user_id"),
            ])
            .nested_query("selectOrders")
            .build()
            .unwrap();
        let rd = ResultDescriptor::builder("userResult", user_type(), vec![orders])
            .build()
            .unwrap();

        assert_eq!(rd.mapped_columns(), &columns(&["TENANT_ID", "USER_ID"]));
        assert!(rd.has_nested_queries());
        assert!(!rd.has_nested_result_maps());
    }

    #[test]
    fn test_direct_column_wins_over_composites() {
        let entry = MappingEntry::builder("orders")
            .column("order_ref")
            .composites(vec![MappingEntry::composite("userId", "user_id")])
            .nested_query("selectOrders")
            .build()
            .unwrap();
        let rd = ResultDescriptor::builder("userResult", user_type(), vec![entry])
            .build()
            .unwrap();
        assert_eq!(rd.mapped_columns(), &columns(&["ORDER_REF"]));
    }

    #[test]
    fn test_nested_result_map_flag() {
        let author = MappingEntry::builder("author")
            .nested_result_map("authorResult")
            .build()
            .unwrap();
        let rd = ResultDescriptor::builder("blogResult", TargetType::new("Blog"), vec![author])
            .build()
            .unwrap();
        assert!(rd.has_nested_result_maps());
        assert!(!rd.has_nested_queries());
    }

    #[test]
    fn test_result_set_entry_is_not_in_row_nesting() {
        let posts = MappingEntry::builder("posts")
            .column("id")
            .foreign_column("blog_id")
            .result_set("posts")
            .nested_result_map("postResult")
            .build()
            .unwrap();
        let rd = ResultDescriptor::builder("blogResult", TargetType::new("Blog"), vec![posts])
            .build()
            .unwrap();
        assert!(!rd.has_nested_result_maps());
    }

    #[test]
    fn test_force_nested_result_maps() {
        let mut rd = ResultDescriptor::builder("userResult", user_type(), vec![column("name", "name")])
            .build()
            .unwrap();
        assert!(!rd.has_nested_result_maps());
        rd.force_nested_result_maps();
        assert!(rd.has_nested_result_maps());
    }

    #[test]
    fn test_is_mapped_column_ignores_case() {
        let rd = ResultDescriptor::builder("userResult", user_type(), vec![column("userId", "user_id")])
            .build()
            .unwrap();
        assert!(rd.is_mapped_column("USER_ID"));
        assert!(rd.is_mapped_column("user_id"));
        assert!(rd.is_mapped_column("User_Id"));
        assert!(!rd.is_mapped_column("user_name"));
    }

    #[test]
    fn test_builder_exposes_target_type_before_build() {
        let builder = ResultDescriptor::builder("userResult", user_type(), vec![]);
        assert_eq!(builder.target_type(), &user_type());
    }

    #[test]
    fn test_discriminator_and_auto_mapping_are_carried() {
        let entry = column("kind", "kind");
        let discriminator = Arc::new(Discriminator::new(
            entry.clone(),
            HashMap::from([("admin".to_string(), "adminResult".to_string())]),
        ));
        let rd = Builder::with_auto_mapping("userResult", user_type(), vec![entry], Some(false))
            .discriminator(Arc::clone(&discriminator))
            .build()
            .unwrap();

        assert_eq!(rd.auto_mapping(), Some(false));
        assert_eq!(rd.discriminator(), Some(&discriminator));
    }

    #[test]
    fn test_build_twice_yields_equal_descriptors() {
        let builder = ResultDescriptor::builder(
            "userResult",
            user_type(),
            vec![id_column("id", "id"), column("name", "name")],
        );
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_descriptor_is_shareable_across_threads() {
        let rd = Arc::new(
            ResultDescriptor::builder("userResult", user_type(), vec![column("name", "name")])
                .build()
                .unwrap(),
        );
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rd = Arc::clone(&rd);
                std::thread::spawn(move || rd.is_mapped_column("NAME"))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_flags() -> impl Strategy<Value = ResultFlags> {
        (0u8..4).prop_map(ResultFlags::from_bits_truncate)
    }

    fn arb_entry() -> impl Strategy<Value = MappingEntry> {
        let plain = ("[a-z]{1,8}", "[a-zA-Z_]{1,12}", arb_flags()).prop_map(
            |(property, column, flags)| {
                MappingEntry::builder(property)
                    .column(column)
                    .flags(flags)
                    .build()
                    .unwrap()
            },
        );
        let composite = (
            "[a-z]{1,8}",
            prop::collection::vec(("[a-z]{1,8}", "[a-zA-Z_]{1,12}"), 1..4),
            arb_flags(),
        )
            .prop_map(|(property, parts, flags)| {
                MappingEntry::builder(property)
                    .composites(
                        parts
                            .into_iter()
                            .map(|(p, c)| MappingEntry::composite(p, c))
                            .collect(),
                    )
                    .nested_query("selectChildren")
                    .flags(flags)
                    .build()
                    .unwrap()
            });
        prop_oneof![3 => plain, 1 => composite]
    }

    fn build(entries: Vec<MappingEntry>) -> ResultDescriptor {
        ResultDescriptor::builder("generated", TargetType::new("Generated"), entries)
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Building from equal inputs yields equal descriptors.
        #[test]
        fn prop_build_is_deterministic(entries in prop::collection::vec(arb_entry(), 0..12)) {
            let a = build(entries.clone());
            let b = build(entries);
            prop_assert_eq!(a, b);
        }

        /// id_mappings is never empty when mappings is not, and equals mappings
        /// when nothing is flagged ID.
        #[test]
        fn prop_id_mappings_fallback(entries in prop::collection::vec(arb_entry(), 1..12)) {
            let rd = build(entries.clone());
            prop_assert!(!rd.id_mappings().is_empty());
            if !entries.iter().any(|e| e.has_flag(ResultFlags::ID)) {
                prop_assert_eq!(rd.id_mappings(), rd.mappings());
            }
        }

        /// Constructor and property mappings partition mappings, preserving order.
        #[test]
        fn prop_constructor_and_property_partition(entries in prop::collection::vec(arb_entry(), 0..12)) {
            let rd = build(entries.clone());
            prop_assert_eq!(
                rd.constructor_mappings().len() + rd.property_mappings().len(),
                entries.len()
            );
            let expected_ctor: Vec<_> = entries
                .iter()
                .filter(|e| e.has_flag(ResultFlags::CONSTRUCTOR))
                .cloned()
                .collect();
            let expected_props: Vec<_> = entries
                .iter()
                .filter(|e| !e.has_flag(ResultFlags::CONSTRUCTOR))
                .cloned()
                .collect();
            prop_assert_eq!(rd.constructor_mappings(), expected_ctor.as_slice());
            prop_assert_eq!(rd.property_mappings(), expected_props.as_slice());
        }

        /// Every direct and composite column is mapped, in any case.
        #[test]
        fn prop_mapped_columns_cover_every_column(entries in prop::collection::vec(arb_entry(), 0..12)) {
            let rd = build(entries.clone());
            for entry in &entries {
                match entry.column() {
                    Some(column) => {
                        prop_assert!(rd.is_mapped_column(&column.to_lowercase()));
                        prop_assert!(rd.is_mapped_column(&column.to_uppercase()));
                    }
                    None => {
                        for composite in entry.composites() {
                            let column = composite.column().unwrap();
                            prop_assert!(rd.is_mapped_column(column));
                        }
                    }
                }
            }
        }
    }
}
