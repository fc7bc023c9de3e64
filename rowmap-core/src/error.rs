//! Error types for rowmap operations

use thiserror::Error;

/// Mapping metadata errors.
///
/// Raised while assembling mapping entries and result descriptors. All of
/// these are configuration-authoring errors: nothing at this layer retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Result descriptors must have an id")]
    MissingDescriptorId,

    #[error("Cannot define both a nested query and a nested result map on property {property}")]
    ConflictingNestedReferences { property: String },

    #[error("Mapping is missing a column for property {property}")]
    MissingColumn { property: String },

    #[error(
        "Foreign columns ({foreign_columns}) do not match columns ({columns}) for property {property}"
    )]
    ForeignColumnMismatch {
        property: String,
        columns: String,
        foreign_columns: String,
    },

    #[error("Result descriptor already registered: {id}")]
    DuplicateDescriptor { id: String },

    #[error("Result descriptor not found: {id}")]
    DescriptorNotFound { id: String },
}

/// Interception errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginError {
    #[error("Operation {operation} on {target} failed: {reason}")]
    OperationFailed {
        target: String,
        operation: String,
        reason: String,
    },

    #[error("Unknown operation {operation} on {target}")]
    UnknownOperation { target: String, operation: String },

    #[error("Invalid argument {index} for {operation}: {reason}")]
    InvalidArgument {
        operation: String,
        index: usize,
        reason: String,
    },

    #[error("Interceptor {interceptor} rejected {operation}: {reason}")]
    Rejected {
        interceptor: String,
        operation: String,
        reason: String,
    },

    #[error("Invalid value for property {key}: {value} - {reason}")]
    InvalidProperty {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Interceptor chain is full: limit is {limit}")]
    ChainFull { limit: usize },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all rowmap errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowMapError {
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for rowmap operations.
pub type RowMapResult<T> = Result<T, RowMapError>;

// =============================================================================
// TESTS
// =============================================================================
