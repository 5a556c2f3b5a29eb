//! Configuration validation for cve-inventory.

use super::types::{AppConfig, IndexConfig, ResolverConfig, ScanConfig};
use crate::error::{InventoryError, Result};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.index.validate());
        errors.extend(self.resolver.validate());
        errors.extend(self.scan.validate());
        errors
    }
}

impl AppConfig {
    /// Return the configuration unchanged if it validates, or one `Config`
    /// error listing every problem.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(self);
        }
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(InventoryError::config(message))
    }
}

impl Validatable for IndexConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(path) = &self.path {
            let known = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "json" | "yaml" | "yml"));
            if !known {
                errors.push(ConfigError::new(
                    "index.path",
                    format!("'{}' must be a .json, .yaml or .yml file", path.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for ResolverConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.pip_command.trim().is_empty() {
            errors.push(ConfigError::new("resolver.pip_command", "must not be empty"));
        }
        let version_ok = !self.min_pip_version.is_empty()
            && self
                .min_pip_version
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        if !version_ok {
            errors.push(ConfigError::new(
                "resolver.min_pip_version",
                format!("'{}' is not a dotted numeric version", self.min_pip_version),
            ));
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "resolver.timeout_secs",
                "must be greater than zero",
            ));
        }
        errors
    }
}

impl Validatable for ScanConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.max_depth == Some(0) {
            errors.push(ConfigError::new(
                "scan.max_depth",
                "0 would scan nothing below the root; omit it for no limit",
            ));
        }
        for dir in &self.skip_dirs {
            if dir.is_empty() || dir.contains(['/', '\\']) {
                errors.push(ConfigError::new(
                    "scan.skip_dirs",
                    format!("'{dir}' must be a single directory name"),
                ));
            }
        }
        errors
    }
}
