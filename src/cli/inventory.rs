//! `scan`, `sbom` and `manifest` command handlers.

use super::output::{render_inventory, write_output, OutputTarget};
use crate::config::AppConfig;
use crate::index::StaticIndex;
use crate::model::TriageMap;
use crate::parsers::ManifestKind;
use crate::pipeline::exit_codes;
use crate::sbom::SbomType;
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Load the product-to-vendor index named by the configuration.
///
/// Without one every identity resolves to the `UNKNOWN` vendor.
pub fn load_index(config: &AppConfig) -> Result<StaticIndex> {
    match &config.index.path {
        Some(path) => {
            let index = StaticIndex::load(path)
                .with_context(|| format!("Failed to load vendor index {}", path.display()))?;
            info!("Loaded {} products from {}", index.len(), path.display());
            Ok(index)
        }
        None => {
            warn!("No vendor index configured; vendors resolve to UNKNOWN unless the source names one");
            Ok(StaticIndex::new())
        }
    }
}

fn emit(triage: &TriageMap, target: &OutputTarget) -> Result<()> {
    write_output(&render_inventory(triage), target)
}

/// Run the scan command over a directory tree (or a single file).
pub fn run_scan(config: &AppConfig, root: &Path, target: &OutputTarget) -> Result<i32> {
    if !root.exists() {
        bail!("{} does not exist", root.display());
    }
    let scanner = config.scanner(load_index(config)?);
    let report = scanner.scan(root);

    emit(&report.triage, target)?;
    for diagnostic in &report.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    Ok(report.exit_code())
}

/// Run the sbom command on one document.
pub fn run_sbom(
    config: &AppConfig,
    path: &Path,
    sbom_type: Option<SbomType>,
    target: &OutputTarget,
) -> Result<i32> {
    let sbom_type = sbom_type.unwrap_or(config.sbom.default_type);
    let scanner = config.scanner(load_index(config)?);
    let triage = scanner
        .scan_sbom(path, sbom_type)
        .with_context(|| format!("Failed to read {sbom_type} SBOM {}", path.display()))?;
    emit(&triage, target)?;
    Ok(exit_codes::SUCCESS)
}

/// Run the manifest command on one file, recognised by its name.
pub fn run_manifest(config: &AppConfig, path: &Path, target: &OutputTarget) -> Result<i32> {
    let Some(kind) = ManifestKind::from_path(path) else {
        bail!(
            "{} is not a recognised manifest file name",
            path.display()
        );
    };
    let scanner = config.scanner(load_index(config)?);
    let triage = scanner
        .scan_manifest(path, kind)
        .with_context(|| format!("Failed to read {kind} {}", path.display()))?;
    emit(&triage, target)?;
    Ok(exit_codes::SUCCESS)
}
