//! Unified error types for cve-inventory.
//!
//! Every failure in the identification core is recoverable: callers convert
//! these errors into diagnostics and carry on with the next file or entry.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cve-inventory operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InventoryError {
    /// A CPE or PURL string failed its grammar check
    #[error("Malformed identifier: {context}")]
    MalformedIdentifier {
        context: String,
        #[source]
        source: IdentifierErrorKind,
    },

    /// The outer structure of a manifest is not valid for its format
    #[error("Unparsable manifest: {context}")]
    UnparsableManifest {
        context: String,
        #[source]
        source: ManifestErrorKind,
    },

    /// An external resolver could not produce concrete versions
    #[error("Unresolved dependencies: {context}")]
    UnresolvedDependency {
        context: String,
        #[source]
        source: ResolverErrorKind,
    },

    /// An SBOM document failed validation
    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific identifier error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IdentifierErrorKind {
    #[error("'{0}' is not a CPE 2.2 string")]
    InvalidCpe22(String),

    #[error("'{0}' is not a CPE 2.3 string")]
    InvalidCpe23(String),

    #[error("'{purl}' is not a package URL: {reason}")]
    InvalidPurl { purl: String, reason: String },
}

/// Specific manifest error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ManifestErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Unknown document format: {0}")]
    UnknownFormat(String),
}

/// Specific resolver subprocess error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ResolverErrorKind {
    #[error("{tool} {found} is too old, version >= {required} is required")]
    ToolTooOld {
        tool: String,
        found: String,
        required: String,
    },

    #[error("{tool} exited unsuccessfully: {output}")]
    Failed { tool: String, output: String },

    #[error("{tool} did not finish within {seconds}s")]
    TimedOut { tool: String, seconds: u64 },

    #[error("{tool} run was cancelled")]
    Cancelled { tool: String },

    #[error("Unusable report from {tool}: {reason}")]
    UnusableReport { tool: String, reason: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for cve-inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl InventoryError {
    /// Create a malformed identifier error with context
    pub fn identifier(context: impl Into<String>, source: IdentifierErrorKind) -> Self {
        Self::MalformedIdentifier {
            context: context.into(),
            source,
        }
    }

    /// Create an unparsable manifest error with context
    pub fn manifest(context: impl Into<String>, source: ManifestErrorKind) -> Self {
        Self::UnparsableManifest {
            context: context.into(),
            source,
        }
    }

    /// Create a manifest error for a missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::manifest(
            "missing required field",
            ManifestErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create an unresolved dependency error with context
    pub fn unresolved(context: impl Into<String>, source: ResolverErrorKind) -> Self {
        Self::UnresolvedDependency {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailure(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for InventoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::manifest(
            "JSON deserialization",
            ManifestErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<serde_yaml::Error> for InventoryError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::manifest(
            "YAML deserialization",
            ManifestErrorKind::InvalidYaml(err.to_string()),
        )
    }
}

impl From<quick_xml::Error> for InventoryError {
    fn from(err: quick_xml::Error) -> Self {
        Self::manifest(
            "XML reading",
            ManifestErrorKind::InvalidXml(err.to_string()),
        )
    }
}

impl From<quick_xml::DeError> for InventoryError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::manifest(
            "XML deserialization",
            ManifestErrorKind::InvalidXml(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to whatever context the error already
/// carries, so a chain like `"scanning vendor/: reading go.mod: ..."` shows
/// the path through the code.
///
/// # Example
///
/// ```ignore
/// use cve_inventory::error::ErrorContext;
///
/// let content = std::fs::read_to_string(path)
///     .with_context(|| format!("reading {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<InventoryError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: InventoryError, new_ctx: &str) -> InventoryError {
    match err {
        InventoryError::MalformedIdentifier {
            context: existing,
            source,
        } => InventoryError::MalformedIdentifier {
            context: chain_context(new_ctx, &existing),
            source,
        },
        InventoryError::UnparsableManifest {
            context: existing,
            source,
        } => InventoryError::UnparsableManifest {
            context: chain_context(new_ctx, &existing),
            source,
        },
        InventoryError::UnresolvedDependency {
            context: existing,
            source,
        } => InventoryError::UnresolvedDependency {
            context: chain_context(new_ctx, &existing),
            source,
        },
        InventoryError::Io {
            path,
            message,
            source,
        } => InventoryError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        InventoryError::ValidationFailure(msg) => {
            InventoryError::ValidationFailure(chain_context(new_ctx, &msg))
        }
        InventoryError::Config(msg) => InventoryError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to a validation error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| InventoryError::ValidationFailure(context.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InventoryError::identifier(
            "external reference",
            IdentifierErrorKind::InvalidCpe23("cpe:2.3:x".to_string()),
        );
        let display = err.to_string();
        assert!(display.contains("Malformed identifier"), "{display}");

        let err = InventoryError::missing_field("version", "package entry");
        let display = err.to_string();
        assert!(display.contains("Unparsable manifest"), "{display}");
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = InventoryError::io("/path/to/go.mod", io_err);

        assert!(err.to_string().contains("/path/to/go.mod"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(InventoryError::manifest(
                "base",
                ManifestErrorKind::UnknownFormat("x".to_string()),
            ))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(InventoryError::UnparsableManifest { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected UnparsableManifest, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(InventoryError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: InventoryError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            InventoryError::UnparsableManifest {
                source: ManifestErrorKind::InvalidJson(_),
                ..
            }
        ));
    }

    #[test]
    fn test_option_context() {
        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(InventoryError::ValidationFailure(msg)) => assert_eq!(msg, "missing value"),
            other => panic!("Expected ValidationFailure, got {other:?}"),
        }
        assert_eq!(Some(3).context_none("unused").unwrap(), 3);
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
