//! rowmap Core - Mapping Metadata
//!
//! Data structures that describe how one row of tabular query output becomes
//! one structured object. Nothing here executes queries, touches a data
//! source, or converts column values; the row materializer consumes these
//! types through their read accessors.
//!
//! # Key Types
//!
//! - `MappingEntry`: one column <-> property association
//! - `Discriminator`: picks an alternate descriptor from a column value
//! - `ResultDescriptor` / `Builder`: the validated, indexed mapping for one type
//! - `DescriptorRegistry`: descriptors by id during configuration assembly
//! - `MapperSettings`: process-wide defaults (auto-mapping, chain limits)
//!
//! All errors live in [`error`] and convert into [`RowMapError`].

pub mod config;
pub mod descriptor;
pub mod discriminator;
pub mod error;
pub mod mapping;
pub mod registry;

pub use config::{AutoMappingBehavior, MapperSettings};
pub use descriptor::{normalize_column, Builder, ResultDescriptor};
pub use discriminator::Discriminator;
pub use error::{ConfigError, MappingError, PluginError, RowMapError, RowMapResult};
pub use mapping::{MappingEntry, MappingEntryBuilder, ResultFlags, TargetType};
pub use registry::{DescriptorRegistry, SharedDescriptors};
