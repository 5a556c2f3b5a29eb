//! R `renv.lock` parser.

use super::{json_entry, read_json, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Parser for renv lockfiles
#[derive(Debug, Clone, Copy, Default)]
pub struct RenvLockParser;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RenvLock {
    #[serde(default)]
    packages: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LockedPackage {
    package: Option<String>,
    version: Option<String>,
}

impl RenvLockParser {
    fn decode(lock: RenvLock) -> impl Iterator<Item = RawFragment> + Send {
        lock.packages.into_iter().filter_map(|(key, entry)| {
            let package: LockedPackage = json_entry(ManifestKind::RenvLock, entry)?;
            let product = package.package.unwrap_or(key);
            let fragment = RawFragment::new(product, package.version?);
            fragment.is_complete().then_some(fragment)
        })
    }
}

impl ManifestParser for RenvLockParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::RenvLock
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let lock: RenvLock = read_json(path)?;
        Ok(Box::new(Self::decode(lock)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Vec<RawFragment> {
        RenvLockParser::decode(serde_json::from_str(json).unwrap()).collect()
    }

    #[test]
    fn test_packages() {
        let out = decode(
            r#"{
                "R": {"Version": "4.2.2", "Repositories": []},
                "Packages": {
                    "cli": {"Package": "cli", "Version": "3.6.0", "Source": "Repository"},
                    "markdown": {"Package": "markdown", "Version": "1.5"},
                    "broken": {"Package": "broken"}
                }
            }"#,
        );
        assert_eq!(
            out,
            vec![
                RawFragment::new("cli", "3.6.0"),
                RawFragment::new("markdown", "1.5"),
            ]
        );
    }

    #[test]
    fn test_wrong_typed_version_keeps_siblings() {
        let out = decode(
            r#"{"Packages": {
                "odd": {"Package": "odd", "Version": 2},
                "rlang": {"Package": "rlang", "Version": "1.1.0"}
            }}"#,
        );
        assert_eq!(out, vec![RawFragment::new("rlang", "1.1.0")]);
    }
}
