//! Configuration types for cve-inventory.

use crate::index::IdentityIndex;
use crate::parsers::{ParserSet, PipOptions, PipRequirementsParser};
use crate::pipeline::{DiscoveryOptions, Scanner};
use crate::resolver::VendorResolver;
use crate::sbom::SbomType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    default_skip_dirs, DEFAULT_MIN_PIP_VERSION, DEFAULT_PIP_COMMAND, DEFAULT_PIP_TIMEOUT_SECS,
};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Product-to-vendor index
    pub index: IndexConfig,
    /// SBOM ingestion
    pub sbom: SbomConfig,
    /// External dependency resolvers
    pub resolver: ResolverConfig,
    /// Tree walking and vendor heuristics
    pub scan: ScanConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Assemble a scanner around `index` with these settings.
    pub fn scanner<I: IdentityIndex>(&self, index: I) -> Scanner<I> {
        let resolver = VendorResolver::new(index).with_hyphen_split(self.scan.hyphen_split);
        let parsers = ParserSet::new(PipRequirementsParser::new(self.resolver.pip_options()));
        Scanner::new(resolver, parsers)
            .with_discovery(self.scan.discovery_options())
            .with_sbom_validation(self.sbom.validate)
            .with_parallel(self.scan.parallel)
    }
}

/// Where the product-to-vendor index comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IndexConfig {
    /// JSON or YAML file mapping product names to vendors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// SBOM ingestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SbomConfig {
    /// Check XML documents structurally before reading them
    pub validate: bool,
    /// Format assumed by `sbom` when `--type` is not given
    pub default_type: SbomType,
}

impl Default for SbomConfig {
    fn default() -> Self {
        Self {
            validate: true,
            default_type: SbomType::Spdx,
        }
    }
}

/// pip resolver subprocess settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ResolverConfig {
    /// pip executable
    pub pip_command: String,
    /// Oldest pip that supports `install --report`
    pub min_pip_version: String,
    /// Seconds before a pip run is killed
    pub timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            pip_command: DEFAULT_PIP_COMMAND.to_string(),
            min_pip_version: DEFAULT_MIN_PIP_VERSION.to_string(),
            timeout_secs: DEFAULT_PIP_TIMEOUT_SECS,
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn pip_options(&self) -> PipOptions {
        PipOptions {
            command: self.pip_command.clone(),
            min_version: self.min_pip_version.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Tree walking and vendor heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScanConfig {
    /// Query each `-` separated segment of unknown products
    pub hyphen_split: bool,
    /// Follow symbolic links while walking
    pub follow_links: bool,
    /// Deepest directory level to descend into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Also ingest SBOM files recognised by their suffix
    pub include_sboms: bool,
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
    /// Decode files on the rayon thread pool
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            hyphen_split: true,
            follow_links: false,
            max_depth: None,
            include_sboms: true,
            skip_dirs: default_skip_dirs(),
            parallel: true,
        }
    }
}

impl ScanConfig {
    #[must_use]
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            follow_links: self.follow_links,
            max_depth: self.max_depth,
            include_sboms: self.include_sboms,
            skip_dirs: self.skip_dirs.clone(),
        }
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn index_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.index.path = path;
        self
    }

    pub const fn validate_sboms(mut self, validate: bool) -> Self {
        self.config.sbom.validate = validate;
        self
    }

    pub const fn default_sbom_type(mut self, sbom_type: SbomType) -> Self {
        self.config.sbom.default_type = sbom_type;
        self
    }

    pub fn pip_command(mut self, command: impl Into<String>) -> Self {
        self.config.resolver.pip_command = command.into();
        self
    }

    pub const fn pip_timeout_secs(mut self, secs: u64) -> Self {
        self.config.resolver.timeout_secs = secs;
        self
    }

    pub const fn hyphen_split(mut self, enabled: bool) -> Self {
        self.config.scan.hyphen_split = enabled;
        self
    }

    pub const fn follow_links(mut self, follow: bool) -> Self {
        self.config.scan.follow_links = follow;
        self
    }

    pub const fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.scan.max_depth = depth;
        self
    }

    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.scan.parallel = parallel;
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}
