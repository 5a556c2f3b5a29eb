//! Configuration for cve-inventory.
//!
//! Settings come from a YAML file discovered in the usual places, with CLI
//! flags layered on top:
//!
//! ```rust,ignore
//! use cve_inventory::config::{load_or_default, AppConfig};
//!
//! let (mut config, loaded_from) = load_or_default(None);
//! config.merge(&AppConfig::builder().hyphen_split(false).build());
//! let scanner = config.scanner(index);
//! ```
//!
//! # Configuration File
//!
//! Place a `.cve-inventory.yaml` file in your project root or
//! `~/.config/cve-inventory/`:
//!
//! ```yaml
//! index:
//!   path: ./vendors.json
//! scan:
//!   hyphen_split: false
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_MIN_PIP_VERSION, DEFAULT_PIP_COMMAND, DEFAULT_PIP_TIMEOUT_SECS, DEFAULT_SKIP_DIRS,
};
pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};
pub use types::{
    AppConfig, AppConfigBuilder, IndexConfig, ResolverConfig, SbomConfig, ScanConfig,
};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and complete `.cve-inventory.yaml` files.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = generate_json_schema();
        for section in ["index", "sbom", "resolver", "scan"] {
            assert!(schema.contains(&format!("\"{section}\"")), "{section}");
        }
    }
}
