//! File discovery: which files in a tree are scanned, and with what.

use crate::parsers::ManifestKind;
use crate::sbom::SbomType;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// SBOM file name suffixes, matched case-insensitively.
pub const SBOM_SUFFIXES: &[(&str, SbomType)] = &[
    (".spdx", SbomType::Spdx),
    (".spdx.json", SbomType::Spdx),
    (".spdx.yaml", SbomType::Spdx),
    (".spdx.yml", SbomType::Spdx),
    (".spdx.rdf", SbomType::Spdx),
    (".spdx.xml", SbomType::Spdx),
    (".cdx.json", SbomType::CycloneDx),
    (".cdx.xml", SbomType::CycloneDx),
    (".swidtag", SbomType::Swid),
];

/// CycloneDX default file names, matched whole.
pub const SBOM_NAMES: &[(&str, SbomType)] = &[
    ("bom.json", SbomType::CycloneDx),
    ("bom.xml", SbomType::CycloneDx),
];

/// Generic SBOM suffixes; the document head decides the family.
pub const SNIFFED_SBOM_SUFFIXES: &[&str] = &[".sbom.json", ".sbom.xml", ".bom.json", ".bom.xml"];

/// Bytes read from a generic SBOM before giving up on its family.
const SNIFF_BYTES: u64 = 8 * 1024;

/// Family of an ambiguously named SBOM, from its first bytes.
fn sniff_sbom(path: &Path) -> Option<SbomType> {
    let mut head = Vec::new();
    let read = std::fs::File::open(path)
        .and_then(|file| file.take(SNIFF_BYTES).read_to_end(&mut head));
    if let Err(e) = read {
        debug!(path = %path.display(), error = %e, "cannot sniff SBOM");
        return None;
    }
    let sniffed = SbomType::sniff(&String::from_utf8_lossy(&head));
    if sniffed.is_none() {
        debug!(path = %path.display(), "not a recognised SBOM");
    }
    sniffed
}

/// How a discovered file is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Manifest(ManifestKind),
    Sbom(SbomType),
}

impl ScanTarget {
    /// Classify a path by its file name.
    ///
    /// Exact manifest names win over SBOM names, which win over typed SBOM
    /// suffixes. Generic `.sbom.json`-style names are classified by content.
    pub fn from_path(path: &Path, include_sboms: bool) -> Option<Self> {
        if let Some(kind) = ManifestKind::from_path(path) {
            return Some(Self::Manifest(kind));
        }
        if !include_sboms {
            return None;
        }
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let by_name = SBOM_NAMES
            .iter()
            .find(|(exact, _)| name == *exact)
            .or_else(|| SBOM_SUFFIXES.iter().find(|(suffix, _)| name.ends_with(suffix)))
            .map(|(_, sbom_type)| *sbom_type);
        let sbom_type = match by_name {
            Some(sbom_type) => sbom_type,
            None if SNIFFED_SBOM_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) => {
                sniff_sbom(path)?
            }
            None => return None,
        };
        Some(Self::Sbom(sbom_type))
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest(kind) => write!(f, "{kind}"),
            Self::Sbom(sbom_type) => write!(f, "{sbom_type} SBOM"),
        }
    }
}

/// Walk options.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub include_sboms: bool,
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
            include_sboms: true,
            skip_dirs: vec![".git".to_string()],
        }
    }
}

/// Result of walking a tree: the files to decode, and the entries that
/// could not be read.
#[derive(Debug, Default)]
pub struct Discovered {
    pub targets: Vec<(PathBuf, ScanTarget)>,
    pub errors: Vec<(PathBuf, String)>,
}

/// Walk `root` and classify every file, in sorted directory order.
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Discovered {
    let mut walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name();
    if let Some(depth) = options.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut discovered = Discovered::default();
    let entries = walker.into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !options
                .skip_dirs
                .iter()
                .any(|skip| entry.file_name().to_str() == Some(skip.as_str()))
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                discovered.errors.push((path, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(target) = ScanTarget::from_path(entry.path(), options.include_sboms) {
            discovered.targets.push((entry.into_path(), target));
        }
    }
    discovered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            ScanTarget::from_path(Path::new("a/Cargo.lock"), true),
            Some(ScanTarget::Manifest(ManifestKind::CargoLock))
        );
        assert_eq!(
            ScanTarget::from_path(Path::new("out/app.SPDX.json"), true),
            Some(ScanTarget::Sbom(SbomType::Spdx))
        );
        assert_eq!(
            ScanTarget::from_path(Path::new("bom.xml"), true),
            Some(ScanTarget::Sbom(SbomType::CycloneDx))
        );
        assert_eq!(ScanTarget::from_path(Path::new("bom.xml"), false), None);
        assert_eq!(ScanTarget::from_path(Path::new("README.md"), true), None);
    }

    #[test]
    fn test_generic_sbom_names_are_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let spdx = dir.path().join("x.sbom.json");
        std::fs::write(&spdx, r#"{"spdxVersion": "SPDX-2.3", "packages": []}"#).unwrap();
        let cdx = dir.path().join("app.bom.json");
        std::fs::write(&cdx, r#"{"bomFormat": "CycloneDX", "components": []}"#).unwrap();
        let other = dir.path().join("notes.sbom.json");
        std::fs::write(&other, r#"{"hello": "world"}"#).unwrap();

        assert_eq!(
            ScanTarget::from_path(&spdx, true),
            Some(ScanTarget::Sbom(SbomType::Spdx))
        );
        assert_eq!(
            ScanTarget::from_path(&cdx, true),
            Some(ScanTarget::Sbom(SbomType::CycloneDx))
        );
        assert_eq!(ScanTarget::from_path(&other, true), None);
        // Only the whole name `bom.json` is CycloneDX without looking
        assert_eq!(
            ScanTarget::from_path(Path::new("/nonexistent/x.sbom.json"), true),
            None
        );
    }

    #[test]
    fn test_discover_skips_configured_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("app/go.mod"), "module x\n").unwrap();
        std::fs::write(dir.path().join(".git/go.mod"), "module y\n").unwrap();
        std::fs::write(dir.path().join("app/notes.txt"), "").unwrap();

        let found = discover(dir.path(), &DiscoveryOptions::default());
        assert_eq!(found.targets.len(), 1);
        assert!(found.targets[0].0.ends_with("app/go.mod"));
        assert!(found.errors.is_empty());
    }

    #[test]
    fn test_discover_single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpanfile");
        std::fs::write(&path, "requires 'DBI', '1.643';\n").unwrap();
        let found = discover(&path, &DiscoveryOptions::default());
        assert_eq!(found.targets, vec![(path, ScanTarget::Manifest(ManifestKind::Cpanfile))]);
    }

    #[test]
    fn test_discover_missing_root_is_reported() {
        let found = discover(Path::new("/nonexistent/tree"), &DiscoveryOptions::default());
        assert!(found.targets.is_empty());
        assert_eq!(found.errors.len(), 1);
    }
}
