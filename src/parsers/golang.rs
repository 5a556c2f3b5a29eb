//! Go `go.mod` parser.

use super::{read_lines, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static MAJOR_VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+$").expect("static regex"));
static GOPKG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.v\d+$").expect("static regex"));

/// Parser for Go module files
#[derive(Debug, Clone, Copy, Default)]
pub struct GoModParser;

/// Product name for a module path.
///
/// The last path segment, skipping a trailing `/vN` major-version segment and
/// stripping a `gopkg.in` style `.vN` suffix.
fn module_product(path: &str) -> &str {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let mut last = segments.next().unwrap_or(path);
    if MAJOR_VERSION_SEGMENT.is_match(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    match GOPKG_SUFFIX.find(last) {
        Some(m) if m.start() > 0 => &last[..m.start()],
        _ => last,
    }
}

/// Release part of a module version.
///
/// `v1.2.3` becomes `1.2.3`; `+incompatible` and anything after the first
/// `-` (pseudo-version timestamps and hashes) are dropped.
fn module_version(version: &str) -> &str {
    let version = version.strip_prefix('v').unwrap_or(version);
    let version = version.strip_suffix("+incompatible").unwrap_or(version);
    version.split('-').next().unwrap_or(version)
}

/// Parse one requirement: `module/path vX.Y.Z [// comment]`.
fn parse_requirement(spec: &str) -> Option<RawFragment> {
    let spec = spec.split("//").next().unwrap_or(spec);
    let mut fields = spec.split_whitespace();
    let module = fields.next()?;
    let version = fields.next()?;
    let version = module_version(version);
    if version.is_empty() {
        return None;
    }
    Some(RawFragment::new(module_product(module), version))
}

/// Lazily decode `require` directives from the lines of a module file.
fn requirements(lines: impl Iterator<Item = String>) -> impl Iterator<Item = RawFragment> {
    let mut in_require_block = false;
    let mut in_other_block = false;
    lines.filter_map(move |line| {
        let line = line.trim();
        if line.starts_with("//") {
            return None;
        }
        if in_require_block || in_other_block {
            if line.starts_with(')') {
                in_require_block = false;
                in_other_block = false;
                return None;
            }
            return if in_require_block {
                parse_requirement(line)
            } else {
                None
            };
        }

        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        if directive == "require" {
            if rest.starts_with('(') {
                in_require_block = true;
                None
            } else {
                parse_requirement(rest)
            }
        } else if rest.starts_with('(') {
            // replace / exclude / retract blocks
            in_other_block = true;
            None
        } else if directive == "require(" {
            in_require_block = true;
            None
        } else {
            None
        }
    })
}

impl ManifestParser for GoModParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::GoMod
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        Ok(Box::new(requirements(read_lines(path)?)))
    }
}
