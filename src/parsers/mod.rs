//! Manifest format parsers.
//!
//! One decoder per dependency-manifest grammar, each turning a file into a
//! lazy sequence of [`RawFragment`](crate::model::RawFragment)s:
//!
//! | File | Parser |
//! |------|--------|
//! | `package-lock.json`, `.package-lock.json` | [`NpmLockParser`] |
//! | `requirements.txt` | [`PipRequirementsParser`] (runs `pip3`) |
//! | `PKG-INFO`, `METADATA` | [`PythonMetadataParser`] |
//! | `Cargo.lock` | [`CargoLockParser`] |
//! | `Gemfile.lock` | [`GemfileLockParser`] |
//! | `go.mod` | [`GoModParser`] |
//! | `composer.lock` | [`ComposerLockParser`] |
//! | `pubspec.lock` | [`PubspecLockParser`] |
//! | `Package.resolved` | [`SwiftResolvedParser`] |
//! | `cpanfile` | [`CpanfileParser`] |
//! | `pom.xml` | [`MavenPomParser`] |
//! | `renv.lock` | [`RenvLockParser`] |
//!
//! ## Usage
//!
//! ```no_run
//! use cve_inventory::parsers::{ManifestKind, ParserSet};
//! use std::path::Path;
//!
//! let parsers = ParserSet::default();
//! let path = Path::new("Cargo.lock");
//! if let Some(kind) = ManifestKind::from_path(path) {
//!     for fragment in parsers.get(kind).parse_file(path) {
//!         println!("{} {}", fragment.product, fragment.version);
//!     }
//! }
//! ```

mod cargo;
mod composer;
mod cpan;
mod detection;
mod gem;
mod golang;
mod maven;
mod npm;
mod pip;
mod pubspec;
mod python;
mod renv;
pub mod strings;
mod swift;
mod traits;

pub use cargo::CargoLockParser;
pub use composer::ComposerLockParser;
pub use cpan::CpanfileParser;
pub use detection::{ManifestKind, MANIFEST_FILES};
pub use gem::GemfileLockParser;
pub use golang::GoModParser;
pub use maven::MavenPomParser;
pub use npm::NpmLockParser;
pub use pip::{
    CancelHandle, PipOptions, PipRequirementsParser, DEFAULT_MIN_PIP_VERSION, DEFAULT_PIP_COMMAND,
    DEFAULT_PIP_TIMEOUT,
};
pub use pubspec::PubspecLockParser;
pub use python::PythonMetadataParser;
pub use renv::RenvLockParser;
pub use swift::SwiftResolvedParser;
pub use traits::{Fragments, ManifestParser};

use crate::error::{ErrorContext, InventoryError, Result};
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// One decoder per [`ManifestKind`].
///
/// Only the pip parser carries configuration; every other decoder is
/// stateless.
#[derive(Debug, Default)]
pub struct ParserSet {
    pip: PipRequirementsParser,
}

impl ParserSet {
    /// Create a parser set with a configured pip resolver.
    #[must_use]
    pub fn new(pip: PipRequirementsParser) -> Self {
        Self { pip }
    }

    /// The decoder for `kind`.
    #[must_use]
    pub fn get(&self, kind: ManifestKind) -> &dyn ManifestParser {
        match kind {
            ManifestKind::NpmLock => &NpmLockParser,
            ManifestKind::PipRequirements => &self.pip,
            ManifestKind::PythonMetadata => &PythonMetadataParser,
            ManifestKind::CargoLock => &CargoLockParser,
            ManifestKind::GemfileLock => &GemfileLockParser,
            ManifestKind::GoMod => &GoModParser,
            ManifestKind::ComposerLock => &ComposerLockParser,
            ManifestKind::PubspecLock => &PubspecLockParser,
            ManifestKind::SwiftResolved => &SwiftResolvedParser,
            ManifestKind::Cpanfile => &CpanfileParser,
            ManifestKind::MavenPom => &MavenPomParser,
            ManifestKind::RenvLock => &RenvLockParser,
        }
    }

    /// The pip parser, for cancellation.
    #[must_use]
    pub fn pip(&self) -> &PipRequirementsParser {
        &self.pip
    }
}

// ============================================================================
// Shared file helpers
// ============================================================================

/// Read a whole manifest as text.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| InventoryError::io(path, e))
}

/// Lazily iterate the lines of a manifest.
///
/// Invalid UTF-8 is replaced rather than ending the sequence, so a truncated
/// or partly binary file still yields its readable lines.
pub(crate) fn read_lines(path: &Path) -> Result<impl Iterator<Item = String> + Send> {
    let file = std::fs::File::open(path).map_err(|e| InventoryError::io(path, e))?;
    Ok(BufReader::new(file)
        .split(b'\n')
        .map_while(std::result::Result::ok)
        .map(|line| {
            let mut line = String::from_utf8_lossy(&line).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            line
        }))
}

/// Read and deserialize a JSON manifest.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_text(path)?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Read and deserialize a YAML manifest.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_text(path)?;
    serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Deserialize one entry of a JSON document.
///
/// An entry that does not fit `T` is skipped so its siblings still decode.
pub(crate) fn json_entry<T: DeserializeOwned>(kind: ManifestKind, entry: serde_json::Value) -> Option<T> {
    serde_json::from_value(entry)
        .map_err(|e| debug!(manifest = kind.name(), "skipping malformed entry: {e}"))
        .ok()
}

/// Deserialize one entry of a YAML document, like [`json_entry`].
pub(crate) fn yaml_entry<T: DeserializeOwned>(kind: ManifestKind, entry: serde_yaml::Value) -> Option<T> {
    serde_yaml::from_value(entry)
        .map_err(|e| debug!(manifest = kind.name(), "skipping malformed entry: {e}"))
        .ok()
}

/// Local part of a qualified XML name (namespace prefix stripped).
pub(crate) fn local_name(name: &[u8]) -> String {
    let name = String::from_utf8_lossy(name);
    name.rfind(':')
        .map_or_else(|| name.to_string(), |idx| name[idx + 1..].to_string())
}

/// Strip one layer of matching single or double quotes.
pub(crate) fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
