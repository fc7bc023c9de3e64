//! Column-to-property mapping entries.
//!
//! A [`MappingEntry`] is one declared association between a result column and a
//! property (or constructor argument) of the target type. Entries are produced
//! by configuration parsing and consumed by the result descriptor builder,
//! which treats them as opaque, already-validated values.
//!
//! ```text
//! column "user_id" ──▶ property "id"        flags: ID
//! column "user_name" ──▶ constructor arg 1  flags: CONSTRUCTOR
//! (composite) ──▶ property "orders"         composites: [tenant_id, user_id]
//! ```

use crate::{MappingError, RowMapResult};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// RESULT FLAGS
// ============================================================================

bitflags! {
    /// Role flags attached to a mapping entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResultFlags: u8 {
        /// Entry participates in row identity
        const ID = 0b0000_0001;
        /// Entry is a constructor argument, not a settable property
        const CONSTRUCTOR = 0b0000_0010;
    }
}

impl Default for ResultFlags {
    fn default() -> Self {
        Self::empty()
    }
}

// Manual serde implementation for ResultFlags (bitflags 2.x + serde)
impl Serialize for ResultFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResultFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ResultFlags bits: {:#04x}", bits))
        })
    }
}

// ============================================================================
// TARGET TYPE
// ============================================================================

/// Name of the structured type a descriptor or entry materializes into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetType(String);

impl TargetType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Target type named after a Rust type.
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// MAPPING ENTRY
// ============================================================================

/// One column <-> property association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(default)]
    property: Option<String>,
    #[serde(default)]
    column: Option<String>,
    #[serde(default)]
    target_type: Option<TargetType>,
    #[serde(default)]
    flags: ResultFlags,
    #[serde(default)]
    nested_result_map_id: Option<String>,
    #[serde(default)]
    nested_query_id: Option<String>,
    /// Named result set for multi-result-set joins
    #[serde(default)]
    result_set: Option<String>,
    #[serde(default)]
    foreign_column: Option<String>,
    #[serde(default)]
    column_prefix: Option<String>,
    #[serde(default)]
    not_null_columns: Vec<String>,
    /// Sub-entries of a multi-column key
    #[serde(default)]
    composites: Vec<MappingEntry>,
    #[serde(default)]
    lazy: bool,
}

impl MappingEntry {
    /// Start building an entry for the given property.
    pub fn builder(property: impl Into<String>) -> MappingEntryBuilder {
        MappingEntryBuilder::new(Some(property.into()))
    }

    /// Start building an entry with no property (constructor arguments).
    pub fn unnamed() -> MappingEntryBuilder {
        MappingEntryBuilder::new(None)
    }

    /// A plain sub-entry of a composite key.
    pub fn composite(property: impl Into<String>, column: impl Into<String>) -> Self {
        let mut entry = Self::blank(Some(property.into()));
        entry.column = Some(column.into());
        entry
    }

    fn blank(property: Option<String>) -> Self {
        Self {
            property,
            column: None,
            target_type: None,
            flags: ResultFlags::empty(),
            nested_result_map_id: None,
            nested_query_id: None,
            result_set: None,
            foreign_column: None,
            column_prefix: None,
            not_null_columns: Vec::new(),
            composites: Vec::new(),
            lazy: false,
        }
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn target_type(&self) -> Option<&TargetType> {
        self.target_type.as_ref()
    }

    pub fn flags(&self) -> ResultFlags {
        self.flags
    }

    pub fn has_flag(&self, flag: ResultFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn nested_result_map_id(&self) -> Option<&str> {
        self.nested_result_map_id.as_deref()
    }

    pub fn nested_query_id(&self) -> Option<&str> {
        self.nested_query_id.as_deref()
    }

    pub fn result_set(&self) -> Option<&str> {
        self.result_set.as_deref()
    }

    pub fn foreign_column(&self) -> Option<&str> {
        self.foreign_column.as_deref()
    }

    pub fn column_prefix(&self) -> Option<&str> {
        self.column_prefix.as_deref()
    }

    pub fn not_null_columns(&self) -> &[String] {
        &self.not_null_columns
    }

    pub fn composites(&self) -> &[MappingEntry] {
        &self.composites
    }

    /// True when this entry maps a multi-column key through sub-entries.
    pub fn is_composite(&self) -> bool {
        !self.composites.is_empty()
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    fn property_label(&self) -> String {
        self.property.clone().unwrap_or_else(|| "<constructor>".to_string())
    }
}

// ============================================================================
// MAPPING ENTRY BUILDER
// ============================================================================

/// Builder for [`MappingEntry`].
///
/// Unlike the descriptor builder, this one validates the entry itself:
/// nested references must not conflict, a column (or composite) is required
/// unless the entry nests another descriptor, and multi-result-set joins must
/// pair every column with a foreign column.
#[derive(Debug, Clone)]
pub struct MappingEntryBuilder {
    entry: MappingEntry,
}

impl MappingEntryBuilder {
    fn new(property: Option<String>) -> Self {
        Self {
            entry: MappingEntry::blank(property),
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.entry.column = Some(column.into());
        self
    }

    pub fn target_type(mut self, target_type: TargetType) -> Self {
        self.entry.target_type = Some(target_type);
        self
    }

    pub fn flags(mut self, flags: ResultFlags) -> Self {
        self.entry.flags = flags;
        self
    }

    /// Mark the entry as part of row identity.
    pub fn id(mut self) -> Self {
        self.entry.flags |= ResultFlags::ID;
        self
    }

    /// Mark the entry as a constructor argument.
    pub fn constructor(mut self) -> Self {
        self.entry.flags |= ResultFlags::CONSTRUCTOR;
        self
    }

    pub fn nested_result_map(mut self, id: impl Into<String>) -> Self {
        self.entry.nested_result_map_id = Some(id.into());
        self
    }

    pub fn nested_query(mut self, id: impl Into<String>) -> Self {
        self.entry.nested_query_id = Some(id.into());
        self
    }

    pub fn result_set(mut self, name: impl Into<String>) -> Self {
        self.entry.result_set = Some(name.into());
        self
    }

    pub fn foreign_column(mut self, column: impl Into<String>) -> Self {
        self.entry.foreign_column = Some(column.into());
        self
    }

    pub fn column_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.entry.column_prefix = Some(prefix.into());
        self
    }

    pub fn not_null_columns(mut self, columns: Vec<String>) -> Self {
        self.entry.not_null_columns = columns;
        self
    }

    pub fn composites(mut self, composites: Vec<MappingEntry>) -> Self {
        self.entry.composites = composites;
        self
    }

    pub fn lazy(mut self, lazy: bool) -> Self {
        self.entry.lazy = lazy;
        self
    }

    /// Validate and produce the entry.
    pub fn build(self) -> RowMapResult<MappingEntry> {
        let entry = self.entry;

        if entry.nested_query_id.is_some() && entry.nested_result_map_id.is_some() {
            return Err(MappingError::ConflictingNestedReferences {
                property: entry.property_label(),
            }
            .into());
        }

        // Column is optional only for entries that nest another descriptor
        if entry.nested_result_map_id.is_none()
            && entry.column.is_none()
            && entry.composites.is_empty()
        {
            return Err(MappingError::MissingColumn {
                property: entry.property_label(),
            }
            .into());
        }

        if entry.result_set.is_some() {
            let columns = count_columns(entry.column.as_deref());
            let foreign_columns = count_columns(entry.foreign_column.as_deref());
            if columns != foreign_columns {
                return Err(MappingError::ForeignColumnMismatch {
                    property: entry.property_label(),
                    columns: entry.column.clone().unwrap_or_default(),
                    foreign_columns: entry.foreign_column.clone().unwrap_or_default(),
                }
                .into());
            }
        }

        Ok(entry)
    }
}

fn count_columns(columns: Option<&str>) -> usize {
    columns.map_or(0, |c| c.split(',').count())
}

// =============================================================================
// TESTS
// =============================================================================
