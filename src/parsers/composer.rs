//! PHP `composer.lock` parser.

use super::{json_entry, read_json, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Parser for Composer lockfiles
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposerLockParser;

#[derive(Debug, Default, Deserialize)]
struct ComposerLock {
    #[serde(default)]
    packages: Vec<Value>,
    #[serde(default, rename = "packages-dev")]
    packages_dev: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    name: Option<String>,
    version: Option<String>,
}

impl LockedPackage {
    /// `symfony/console` at `v6.2.7` becomes `console` / `6.2.7`.
    fn fragment(&self) -> Option<RawFragment> {
        let name = self.name.as_deref()?;
        let product = name.rsplit('/').next().unwrap_or(name);
        let version = self.version.as_deref()?;
        let version = version.strip_prefix('v').unwrap_or(version);
        let fragment = RawFragment::new(product, version);
        fragment.is_complete().then_some(fragment)
    }
}

impl ComposerLockParser {
    fn decode(lock: ComposerLock) -> impl Iterator<Item = RawFragment> + Send {
        lock.packages
            .into_iter()
            .chain(lock.packages_dev)
            .filter_map(|entry| json_entry::<LockedPackage>(ManifestKind::ComposerLock, entry))
            .filter_map(|package| package.fragment())
    }
}

impl ManifestParser for ComposerLockParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::ComposerLock
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let lock: ComposerLock = read_json(path)?;
        Ok(Box::new(Self::decode(lock)))
    }
}
