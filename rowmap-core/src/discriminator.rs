//! Discriminators for polymorphic row mapping.

use crate::MappingEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Selects an alternate result descriptor from a column's runtime value.
///
/// The discriminating column comes from `entry`; `cases` maps the column's
/// string value to the id of the descriptor that should materialize the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    entry: MappingEntry,
    cases: HashMap<String, String>,
}

impl Discriminator {
    pub fn new(entry: MappingEntry, cases: HashMap<String, String>) -> Self {
        Self { entry, cases }
    }

    /// The entry whose column is inspected.
    pub fn entry(&self) -> &MappingEntry {
        &self.entry
    }

    pub fn cases(&self) -> &HashMap<String, String> {
        &self.cases
    }

    /// Descriptor id selected by a column value, if any case matches.
    pub fn descriptor_id_for(&self, value: &str) -> Option<&str> {
        self.cases.get(value).map(String::as_str)
    }

    /// Iterate over every descriptor id this discriminator can select.
    pub fn descriptor_ids(&self) -> impl Iterator<Item = &str> {
        self.cases.values().map(String::as_str)
    }
}
