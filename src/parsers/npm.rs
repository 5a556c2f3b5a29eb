//! npm `package-lock.json` parser.
//!
//! Handles both the flat `packages` map of lockfile version 2 and later, and
//! the nested `dependencies` map of the legacy schema.

use super::{read_json, Fragments, ManifestKind, ManifestParser};
use crate::error::{InventoryError, Result};
use crate::model::RawFragment;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Parser for npm lockfiles
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmLockParser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageLock {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    version: Value,
    #[serde(default)]
    lockfile_version: Value,
    #[serde(default)]
    packages: IndexMap<String, Value>,
    #[serde(default)]
    dependencies: IndexMap<String, Value>,
}

impl NpmLockParser {
    /// Decode an already-loaded lockfile document, one entry at a time.
    fn decode(lock: PackageLock) -> impl Iterator<Item = RawFragment> + Send {
        let root = match (lock.name.as_str(), lock.version.as_str()) {
            (Some(name), Some(version)) => Some(RawFragment::new(name, version)),
            _ => None,
        };

        let (modern, legacy) = match lock.lockfile_version.as_u64() {
            // No lockfileVersion: not a lockfile npm wrote
            None => (IndexMap::new(), IndexMap::new()),
            Some(v) if v >= 2 => (lock.packages, IndexMap::new()),
            Some(_) => (IndexMap::new(), lock.dependencies),
        };

        let modern = modern.into_iter().flat_map(|(key, entry)| {
            // The root entry "" names itself
            let name = if key.is_empty() {
                entry.get("name").and_then(Value::as_str)
            } else {
                Some(package_name(&key))
            };
            let version = entry.get("version").and_then(Value::as_str);
            let own = match (name, version) {
                (Some(name), Some(version)) => Some(RawFragment::new(name, version)),
                _ => None,
            };
            own.into_iter().chain(requires(&entry))
        });

        let legacy = legacy.into_iter().flat_map(|(key, entry)| {
            let version = match &entry {
                Value::String(version) => Some(version.as_str()),
                other => other.get("version").and_then(Value::as_str),
            };
            let own = version.map(|version| RawFragment::new(package_name(&key), version));
            own.into_iter().chain(requires(&entry))
        });

        root.into_iter().chain(modern).chain(legacy)
    }
}

/// Package name from a lockfile key: the last `/` segment.
///
/// `node_modules/@actions/core` and `@actions/core` both become `core`.
fn package_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Concrete `requires` constraints of one entry. `*` is never reported.
fn requires(entry: &Value) -> Vec<RawFragment> {
    let Some(requires) = entry.get("requires").and_then(Value::as_object) else {
        return Vec::new();
    };
    requires
        .iter()
        .filter_map(|(name, constraint)| match constraint.as_str() {
            Some("*") | None => None,
            Some(constraint) => Some(RawFragment::new(package_name(name), constraint)),
        })
        .collect()
}

impl ManifestParser for NpmLockParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::NpmLock
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let value: Value = read_json(path)?;
        if !value.is_object() {
            return Err(InventoryError::missing_field(
                "lockfileVersion",
                path.display().to_string(),
            ));
        }
        let lock: PackageLock = serde_json::from_value(value)?;
        Ok(Box::new(Self::decode(lock)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Vec<(String, String)> {
        let lock: PackageLock = serde_json::from_str(json).unwrap();
        NpmLockParser::decode(lock)
            .map(|f| (f.product, f.version))
            .collect()
    }

    fn pair(product: &str, version: &str) -> (String, String) {
        (product.to_string(), version.to_string())
    }

    #[test]
    fn test_lockfile_v2_packages_and_requires() {
        let out = decode(
            r#"{
                "name": "app", "version": "1.0.0", "lockfileVersion": 3,
                "packages": {
                    "": {"name": "app", "version": "1.0.0"},
                    "node_modules/@actions/cache": {
                        "version": "3.2.1",
                        "requires": {"@actions/core": "^1.10.0", "semver": "*"}
                    },
                    "node_modules/@actions/http-client": {"version": "2.1.0"}
                }
            }"#,
        );
        assert_eq!(
            out,
            vec![
                pair("app", "1.0.0"),
                pair("app", "1.0.0"),
                pair("cache", "3.2.1"),
                pair("core", "^1.10.0"),
                pair("http-client", "2.1.0"),
            ]
        );
        assert!(!out.iter().any(|(_, v)| v == "*"));
    }

    #[test]
    fn test_legacy_string_and_object_forms_agree() {
        let string_form = decode(r#"{"lockfileVersion": 1, "dependencies": {"expect": "29.5.0"}}"#);
        let object_form = decode(
            r#"{"lockfileVersion": 1, "dependencies": {"expect": {"version": "29.5.0"}}}"#,
        );
        assert_eq!(string_form, object_form);
        assert_eq!(string_form, vec![pair("expect", "29.5.0")]);
    }

    #[test]
    fn test_legacy_requires_one_level() {
        let out = decode(
            r#"{"lockfileVersion": 1, "dependencies": {
                "@jest/expect": {
                    "version": "29.5.0",
                    "requires": {"expect": "29.5.0", "any": "*"},
                    "dependencies": {"nested": {"version": "9.9.9"}}
                }
            }}"#,
        );
        assert_eq!(out, vec![pair("expect", "29.5.0"), pair("expect", "29.5.0")]);
    }

    #[test]
    fn test_without_lockfile_version_only_top_level() {
        let out = decode(r#"{"name": "generator", "version": "0.1.0", "dependencies": {"x": "1"}}"#);
        assert_eq!(out, vec![pair("generator", "0.1.0")]);
    }

    #[test]
    fn test_wrong_typed_top_level_fields_keep_packages() {
        let out = decode(
            r#"{"name": 7, "version": "1.0.0", "lockfileVersion": 2,
                "packages": {"node_modules/lodash": {"version": "4.17.21"},
                             "node_modules/odd": {"version": 4}}}"#,
        );
        assert_eq!(out, vec![pair("lodash", "4.17.21")]);
    }

    #[test]
    fn test_non_object_document_is_unparsable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package-lock.json");
        std::fs::write(&path, "[1,2,3]").unwrap();
        assert!(NpmLockParser.fragments(&path).is_err());
        assert_eq!(NpmLockParser.parse_file(&path).count(), 0);
    }
}
