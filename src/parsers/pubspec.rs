//! Dart `pubspec.lock` parser.

use super::{read_yaml, yaml_entry, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Parser for pub lockfiles
#[derive(Debug, Clone, Copy, Default)]
pub struct PubspecLockParser;

#[derive(Debug, Default, Deserialize)]
struct PubspecLock {
    #[serde(default)]
    packages: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    version: Option<String>,
}

impl PubspecLockParser {
    fn decode(lock: PubspecLock) -> impl Iterator<Item = RawFragment> + Send {
        lock.packages.into_iter().filter_map(|(name, entry)| {
            let package: LockedPackage = yaml_entry(ManifestKind::PubspecLock, entry)?;
            let fragment = RawFragment::new(name, package.version?);
            fragment.is_complete().then_some(fragment)
        })
    }
}

impl ManifestParser for PubspecLockParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::PubspecLock
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let lock: PubspecLock = read_yaml(path)?;
        Ok(Box::new(Self::decode(lock)))
    }
}
