//! Configuration types

use crate::{ConfigError, ResultDescriptor, RowMapResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Process-wide policy for mapping columns that no entry declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoMappingBehavior {
    /// Never auto-map
    None,
    /// Auto-map flat results only, not nested ones
    Partial,
    /// Auto-map everything, nested results included
    Full,
}

impl AutoMappingBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoMappingBehavior::None => "none",
            AutoMappingBehavior::Partial => "partial",
            AutoMappingBehavior::Full => "full",
        }
    }
}

impl fmt::Display for AutoMappingBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoMappingBehavior {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(AutoMappingBehavior::None),
            "partial" => Ok(AutoMappingBehavior::Partial),
            "full" => Ok(AutoMappingBehavior::Full),
            _ => Err(ConfigError::InvalidValue {
                field: "auto_mapping_behavior".to_string(),
                value: s.to_string(),
                reason: "expected one of none, partial, full".to_string(),
            }),
        }
    }
}

/// Process-wide mapper settings.
///
/// Descriptors only carry their own tri-state auto-mapping flag; resolving an
/// unset flag against these settings is up to the row materializer, through
/// [`MapperSettings::should_auto_map`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperSettings {
    pub auto_mapping_behavior: AutoMappingBehavior,
    /// Upper bound on the number of interceptors in one chain
    pub max_interceptors: usize,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            auto_mapping_behavior: AutoMappingBehavior::Partial,
            max_interceptors: 64,
        }
    }
}

impl MapperSettings {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `ROWMAP_AUTO_MAPPING_BEHAVIOR`: `none`, `partial` or `full` (default: partial)
    /// - `ROWMAP_MAX_INTERCEPTORS`: Maximum interceptors per chain (default: 64)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            auto_mapping_behavior: std::env::var("ROWMAP_AUTO_MAPPING_BEHAVIOR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.auto_mapping_behavior),
            max_interceptors: std::env::var("ROWMAP_MAX_INTERCEPTORS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_interceptors),
        }
    }

    /// Validate the settings.
    /// Returns Ok(()) if valid, Err(RowMapError::Config) if invalid.
    pub fn validate(&self) -> RowMapResult<()> {
        if self.max_interceptors == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_interceptors".to_string(),
                value: self.max_interceptors.to_string(),
                reason: "max_interceptors must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Decide whether unmapped columns of `descriptor` should be auto-mapped.
    ///
    /// An explicit flag on the descriptor always wins. Otherwise nested
    /// results are auto-mapped only under `Full`, flat ones under anything but
    /// `None`.
    pub fn should_auto_map(&self, descriptor: &ResultDescriptor, nested: bool) -> bool {
        if let Some(explicit) = descriptor.auto_mapping() {
            return explicit;
        }
        if nested {
            self.auto_mapping_behavior == AutoMappingBehavior::Full
        } else {
            self.auto_mapping_behavior != AutoMappingBehavior::None
        }
    }
}
