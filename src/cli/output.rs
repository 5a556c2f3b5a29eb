//! Plain-text inventory output.

use crate::model::TriageMap;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Target for output - either stdout or a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    #[must_use]
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// One `vendor,product,version` line per identity, in first-seen order.
#[must_use]
pub fn render_inventory(triage: &TriageMap) -> String {
    let mut out = String::new();
    for product in triage.keys() {
        let _ = writeln!(out, "{product}");
    }
    out
}

/// Write output to the target (stdout or file)
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            print!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            tracing::info!("Inventory written to {}", path.display());
            Ok(())
        }
    }
}
