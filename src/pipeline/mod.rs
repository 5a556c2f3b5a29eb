//! Scan orchestration: walk a tree, decode every recognised file, and fold
//! the identities into one triage map.
//!
//! Files are decoded in parallel with `rayon`; results are merged in
//! discovery order so the output does not depend on scheduling. No error
//! stops a scan: each becomes a [`Diagnostic`].

mod discovery;

pub use discovery::{
    discover, Discovered, DiscoveryOptions, ScanTarget, SBOM_NAMES, SBOM_SUFFIXES,
    SNIFFED_SBOM_SUFFIXES,
};

use crate::error::Result;
use crate::index::IdentityIndex;
use crate::model::{triage, TriageMap};
use crate::parsers::{CancelHandle, ManifestKind, ParserSet};
use crate::resolver::VendorResolver;
use crate::sbom::{SbomIngestor, SbomType};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Exit codes for the binary
pub mod exit_codes {
    /// Scan finished without diagnostics
    pub const SUCCESS: i32 = 0;
    /// Scan finished but some files could not be decoded
    pub const DIAGNOSTICS: i32 = 1;
    /// An error occurred before the scan could run
    pub const ERROR: i32 = 2;
}

/// A file that contributed nothing because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Everything a scan found.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub triage: TriageMap,
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
}

impl ScanReport {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.diagnostics.is_empty() {
            exit_codes::SUCCESS
        } else {
            exit_codes::DIAGNOSTICS
        }
    }
}

/// Walks trees and decodes manifests and SBOMs.
#[derive(Debug)]
pub struct Scanner<I> {
    ingestor: SbomIngestor<I>,
    parsers: ParserSet,
    discovery: DiscoveryOptions,
    parallel: bool,
}

impl<I: IdentityIndex> Scanner<I> {
    pub fn new(resolver: VendorResolver<I>, parsers: ParserSet) -> Self {
        Self {
            ingestor: SbomIngestor::new(resolver),
            parsers,
            discovery: DiscoveryOptions::default(),
            parallel: true,
        }
    }

    #[must_use]
    pub fn with_discovery(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    #[must_use]
    pub fn with_sbom_validation(mut self, validate: bool) -> Self {
        self.ingestor = self.ingestor.with_validation(validate);
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn resolver(&self) -> &VendorResolver<I> {
        self.ingestor.resolver()
    }

    /// Handle that cancels a running pip resolution.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.parsers.pip().cancel_handle()
    }

    /// Decode one manifest into identities.
    pub fn scan_manifest(&self, path: &Path, kind: ManifestKind) -> Result<TriageMap> {
        let mut map = TriageMap::new();
        let resolver = self.ingestor.resolver();
        for fragment in self.parsers.get(kind).fragments(path)? {
            for product in resolver.resolve(&fragment) {
                triage::record(&mut map, product, Some(path));
            }
        }
        debug!(
            path = %path.display(),
            %kind,
            ecosystem = %kind.ecosystem(),
            identities = map.len(),
            "decoded manifest"
        );
        Ok(map)
    }

    /// Decode one SBOM into identities.
    pub fn scan_sbom(&self, path: &Path, sbom_type: SbomType) -> Result<TriageMap> {
        self.ingestor.ingest(path, sbom_type)
    }

    /// Decode one classified file.
    pub fn scan_target(&self, path: &Path, target: ScanTarget) -> Result<TriageMap> {
        match target {
            ScanTarget::Manifest(kind) => self.scan_manifest(path, kind),
            ScanTarget::Sbom(sbom_type) => self.scan_sbom(path, sbom_type),
        }
    }

    /// Walk `root` and decode everything recognised under it.
    pub fn scan(&self, root: &Path) -> ScanReport {
        let Discovered { targets, errors } = discover(root, &self.discovery);
        info!(root = %root.display(), files = targets.len(), "scanning");

        let decode = |(path, target): &(PathBuf, ScanTarget)| {
            (path.clone(), self.scan_target(path, *target))
        };
        let results: Vec<(PathBuf, Result<TriageMap>)> = if self.parallel {
            targets.par_iter().map(decode).collect()
        } else {
            targets.iter().map(decode).collect()
        };

        let mut report = ScanReport {
            files_scanned: targets.len(),
            diagnostics: errors
                .into_iter()
                .map(|(path, message)| Diagnostic { path, message })
                .collect(),
            ..ScanReport::default()
        };
        for (path, result) in results {
            match result {
                Ok(map) => triage::merge(&mut report.triage, map),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not decode file");
                    report.diagnostics.push(Diagnostic {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            identities = report.triage.len(),
            diagnostics = report.diagnostics.len(),
            "scan complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::StaticIndex;
    use crate::model::ProductInfo;

    fn scanner() -> Scanner<StaticIndex> {
        let index = StaticIndex::new().with("serde", "serde-rs").with("libc", "rust-lang");
        Scanner::new(VendorResolver::new(index), ParserSet::default())
    }

    #[test]
    fn test_exit_codes_values() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::DIAGNOSTICS, 1);
        assert_eq!(exit_codes::ERROR, 2);
    }

    #[test]
    fn test_scan_tree_merges_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let lock = "[[package]]\nname = \"serde\"\nversion = \"1.0.152\"\n\n[[package]]\nname = \"libc\"\nversion = \"0.2.139\"\n";
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("a/Cargo.lock"), lock).unwrap();
        std::fs::write(dir.path().join("b/Cargo.lock"), lock).unwrap();
        std::fs::write(dir.path().join("b/composer.lock"), "{ broken").unwrap();

        let report = scanner().scan(dir.path());
        assert_eq!(report.files_scanned, 3);
        assert_eq!(report.triage.len(), 2);
        let serde = ProductInfo::try_new("serde-rs", "serde", "1.0.152").unwrap();
        assert_eq!(report.triage[&serde].paths.len(), 2);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].path.ends_with("b/composer.lock"));
        assert_eq!(report.exit_code(), exit_codes::DIAGNOSTICS);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let dir = tempfile::tempdir().unwrap();
        for (i, name) in ["serde", "libc", "rand", "log"].iter().enumerate() {
            let sub = dir.path().join(format!("crate{i}"));
            std::fs::create_dir_all(&sub).unwrap();
            std::fs::write(
                sub.join("Cargo.lock"),
                format!("[[package]]\nname = \"{name}\"\nversion = \"1.{i}.0\"\n"),
            )
            .unwrap();
        }
        let parallel = scanner().scan(dir.path());
        let sequential = scanner().with_parallel(false).scan(dir.path());
        assert_eq!(
            parallel.triage.keys().collect::<Vec<_>>(),
            sequential.triage.keys().collect::<Vec<_>>()
        );
    }
}
