//! Ruby `Gemfile.lock` parser.

use super::{read_lines, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use std::path::Path;

/// Parser for Bundler lockfiles
#[derive(Debug, Clone, Copy, Default)]
pub struct GemfileLockParser;

/// Resolved gems sit under a `specs:` key, indented exactly four spaces.
/// Deeper lines are the gem's own dependency constraints.
const SPEC_INDENT: &str = "    ";

/// Parse one `    name (version)` spec line.
fn parse_spec(line: &str) -> Option<RawFragment> {
    let entry = line.strip_prefix(SPEC_INDENT)?;
    if entry.starts_with(' ') {
        return None;
    }
    let (name, rest) = entry.split_once(" (")?;
    let version = rest.trim_end().strip_suffix(')')?;
    Some(RawFragment::new(name.trim(), version.trim()))
}

/// Lazily decode spec lines from the lines of a lockfile.
fn specs(lines: impl Iterator<Item = String>) -> impl Iterator<Item = RawFragment> {
    let mut in_specs = false;
    lines.filter_map(move |line| {
        if line.trim().is_empty() {
            return None;
        }
        if !line.starts_with(' ') {
            // New section header (GEM, GIT, PATH, PLATFORMS, ...)
            in_specs = false;
            return None;
        }
        if line.trim_end() == "  specs:" {
            in_specs = true;
            return None;
        }
        if in_specs {
            parse_spec(&line)
        } else {
            None
        }
    })
}

impl ManifestParser for GemfileLockParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::GemfileLock
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        Ok(Box::new(specs(read_lines(path)?)))
    }
}
