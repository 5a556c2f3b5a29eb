//! Python package metadata (`PKG-INFO` / `METADATA`) parser.

use super::strings::{printable_strings, MIN_STRING_LENGTH};
use super::{Fragments, ManifestKind, ManifestParser};
use crate::error::{InventoryError, Result};
use crate::model::RawFragment;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static NAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Name: (.+)$").expect("static regex"));
static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Version: (.+)$").expect("static regex"));

/// Only the metadata header is trusted; later lines belong to the long
/// description and may quote other packages.
const HEADER_LINES: usize = 3;

/// Parser for Python core metadata files
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonMetadataParser;

impl PythonMetadataParser {
    /// Extract the package name and version from raw file bytes.
    ///
    /// Returns `None` when either header is missing.
    #[must_use]
    pub fn decode(data: &[u8]) -> Option<RawFragment> {
        let text = printable_strings(data, MIN_STRING_LENGTH);
        let header: Vec<&str> = text.lines().take(HEADER_LINES).collect();
        let header = header.join("\n");

        let name = NAME_LINE.captures(&header)?.get(1)?.as_str().trim();
        let version = VERSION_LINE.captures(&header)?.get(1)?.as_str().trim();
        Some(RawFragment::new(name, version))
    }
}

impl ManifestParser for PythonMetadataParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::PythonMetadata
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let data = std::fs::read(path).map_err(|e| InventoryError::io(path, e))?;
        let fragment = Self::decode(&data);
        if fragment.is_none() {
            debug!("{} is an invalid METADATA/PKG-INFO", path.display());
        }
        Ok(Box::new(fragment.into_iter()))
    }
}
