//! Perl `cpanfile` parser.

use super::{read_lines, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `requires 'Module::Name', '1.23';` and the `recommends` / `test_requires`
/// variants. The version must be a quoted literal; version ranges such as
/// `'>= 1.0'` are not concrete and are skipped.
static REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?:requires|recommends|test_requires|build_requires|configure_requires)\s+['"]([^'"]+)['"]\s*(?:,|=>)\s*['"]v?([0-9][0-9A-Za-z._]*)['"]"#,
    )
    .expect("static regex")
});

/// Parser for cpanfile dependency lists
#[derive(Debug, Clone, Copy, Default)]
pub struct CpanfileParser;

fn parse_requirement(line: &str) -> Option<RawFragment> {
    let line = line.split('#').next().unwrap_or(line);
    let caps = REQUIREMENT.captures(line)?;
    Some(RawFragment::new(
        caps.get(1)?.as_str().trim(),
        caps.get(2)?.as_str().trim(),
    ))
}

impl ManifestParser for CpanfileParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Cpanfile
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        Ok(Box::new(
            read_lines(path)?.filter_map(|line| parse_requirement(&line)),
        ))
    }
}
