//! Swift Package Manager `Package.resolved` parser.
//!
//! Version 1 files nest the pins under `object` and name them `package`;
//! versions 2 and 3 list them at the top level and name them `identity`.

use super::{json_entry, read_json, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Parser for SwiftPM resolution files
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiftResolvedParser;

#[derive(Debug, Default, Deserialize)]
struct Resolved {
    object: Option<PinList>,
    #[serde(default)]
    pins: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PinList {
    #[serde(default)]
    pins: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Pin {
    #[serde(alias = "identity")]
    package: Option<String>,
    #[serde(rename = "repositoryURL", alias = "location")]
    repository_url: Option<String>,
    #[serde(default)]
    state: PinState,
}

#[derive(Debug, Default, Deserialize)]
struct PinState {
    version: Option<String>,
}

impl SwiftResolvedParser {
    fn decode(resolved: Resolved) -> impl Iterator<Item = RawFragment> + Send {
        let legacy = resolved.object.into_iter().flat_map(|object| object.pins);
        legacy
            .chain(resolved.pins)
            .filter_map(|entry| json_entry::<Pin>(ManifestKind::SwiftResolved, entry))
            .filter_map(|pin| {
                let product = pin.package?;
                let Some(version) = pin.state.version else {
                    // Branch or revision pins have no release version
                    debug!(product = %product, "skipping pin without a version");
                    return None;
                };
                if let Some(url) = &pin.repository_url {
                    debug!(product = %product, version = %version, url = %url, "swift pin");
                }
                let fragment = RawFragment::new(product, version);
                fragment.is_complete().then_some(fragment)
            })
    }
}

impl ManifestParser for SwiftResolvedParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::SwiftResolved
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let resolved: Resolved = read_json(path)?;
        Ok(Box::new(Self::decode(resolved)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Vec<RawFragment> {
        SwiftResolvedParser::decode(serde_json::from_str(json).unwrap()).collect()
    }

    #[test]
    fn test_version_one_pins() {
        let out = decode(
            r#"{
                "object": {"pins": [
                    {"package": "Alamofire", "repositoryURL": "https://github.com/Alamofire/Alamofire.git",
                     "state": {"branch": null, "revision": "abc", "version": "5.6.4"}},
                    {"package": "Nimble", "repositoryURL": "https://github.com/Quick/Nimble",
                     "state": {"branch": "main", "revision": "def", "version": null}}
                ]},
                "version": 1
            }"#,
        );
        assert_eq!(out, vec![RawFragment::new("Alamofire", "5.6.4")]);
    }

    #[test]
    fn test_version_two_pins() {
        let out = decode(
            r#"{
                "pins": [
                    {"identity": "swift-argument-parser", "kind": "remoteSourceControl",
                     "location": "https://github.com/apple/swift-argument-parser",
                     "state": {"revision": "fee6", "version": "1.2.2"}}
                ],
                "version": 2
            }"#,
        );
        assert_eq!(out, vec![RawFragment::new("swift-argument-parser", "1.2.2")]);
    }

    #[test]
    fn test_malformed_pin_keeps_siblings() {
        let out = decode(
            r#"{
                "pins": [
                    {"identity": "swift-nio", "state": {"version": 2}},
                    {"identity": "swift-log", "state": {"version": "1.5.2"}},
                    {"identity": ["not", "a", "name"], "state": {"version": "0.1.0"}}
                ],
                "version": 2
            }"#,
        );
        assert_eq!(out, vec![RawFragment::new("swift-log", "1.5.2")]);
    }

    #[test]
    fn test_invalid_json_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Package.resolved");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(SwiftResolvedParser.fragments(&path).is_err());
        assert_eq!(SwiftResolvedParser.parse_file(&path).count(), 0);
    }
}
