//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".cve-inventory.yaml",
    ".cve-inventory.yml",
    "cve-inventory.yaml",
    "cve-inventory.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/cve-inventory/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let cwd = std::env::current_dir().ok();
    if let Some(path) = cwd.as_deref().and_then(find_config_in_dir) {
        return Some(path);
    }

    if let Some(path) = cwd
        .as_deref()
        .and_then(find_git_root)
        .and_then(|root| find_config_in_dir(&root))
    {
        return Some(path);
    }

    if let Some(path) =
        dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("cve-inventory")))
    {
        return Some(path);
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up from `start`.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence
    /// wherever it differs from the defaults.
    ///
    /// This is how CLI flags are layered over file config.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        if other.index.path.is_some() {
            self.index.path.clone_from(&other.index.path);
        }

        if other.sbom.validate != defaults.sbom.validate {
            self.sbom.validate = other.sbom.validate;
        }
        if other.sbom.default_type != defaults.sbom.default_type {
            self.sbom.default_type = other.sbom.default_type;
        }

        if other.resolver.pip_command != defaults.resolver.pip_command {
            self.resolver.pip_command.clone_from(&other.resolver.pip_command);
        }
        if other.resolver.min_pip_version != defaults.resolver.min_pip_version {
            self.resolver
                .min_pip_version
                .clone_from(&other.resolver.min_pip_version);
        }
        if other.resolver.timeout_secs != defaults.resolver.timeout_secs {
            self.resolver.timeout_secs = other.resolver.timeout_secs;
        }

        if other.scan.hyphen_split != defaults.scan.hyphen_split {
            self.scan.hyphen_split = other.scan.hyphen_split;
        }
        if other.scan.follow_links {
            self.scan.follow_links = true;
        }
        if other.scan.max_depth.is_some() {
            self.scan.max_depth = other.scan.max_depth;
        }
        if other.scan.include_sboms != defaults.scan.include_sboms {
            self.scan.include_sboms = other.scan.include_sboms;
        }
        if other.scan.skip_dirs != defaults.scan.skip_dirs {
            self.scan.skip_dirs.clone_from(&other.scan.skip_dirs);
        }
        if other.scan.parallel != defaults.scan.parallel {
            self.scan.parallel = other.scan.parallel;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_example_config() -> String {
    r"# cve-inventory configuration
# =========================
#
# Place this file at .cve-inventory.yaml in your project root or at
# ~/.config/cve-inventory/cve-inventory.yaml. CLI flags override it.

# Product-to-vendor index: a JSON or YAML mapping of product name to vendors
# index:
#   path: ./vendors.json

# SBOM ingestion
sbom:
  # Structurally check XML documents before reading them
  validate: true
  # Format assumed when --type is omitted: spdx, cyclonedx, swid
  default_type: spdx

# External resolvers
resolver:
  pip_command: pip3
  # Oldest pip with `install --report`
  min_pip_version: '22.2'
  timeout_secs: 300

# Tree walking
scan:
  # Query each '-' separated part of products missing from the index
  hyphen_split: true
  follow_links: false
  # max_depth: 8
  # Also read *.spdx.json, *.cdx.xml, *.swidtag and similar files
  include_sboms: true
  skip_dirs:
    - .git
    - .hg
    - .svn
  parallel: true
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
