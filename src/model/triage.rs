//! Triage aggregate: every identity found in a scan and where it came from.

use super::ProductInfo;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Review state of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Remarks {
    #[default]
    NewFound,
    Unexplored,
    Confirmed,
    Mitigated,
    FalsePositive,
    NotAffected,
}

impl fmt::Display for Remarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NewFound => "NewFound",
            Self::Unexplored => "Unexplored",
            Self::Confirmed => "Confirmed",
            Self::Mitigated => "Mitigated",
            Self::FalsePositive => "False Positive",
            Self::NotAffected => "Not Affected",
        };
        f.write_str(label)
    }
}

/// Triage record attached to each identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriageData {
    pub remarks: Remarks,
    pub comments: String,
    pub severity: String,
    /// Files that contributed this identity
    pub paths: BTreeSet<PathBuf>,
}

impl TriageData {
    /// A fresh record for a newly found identity.
    #[must_use]
    pub fn new_found(path: Option<&Path>) -> Self {
        let mut data = Self::default();
        if let Some(path) = path {
            data.paths.insert(path.to_path_buf());
        }
        data
    }
}

/// Identity to triage map, in first-seen order.
pub type TriageMap = IndexMap<ProductInfo, TriageData>;

/// Record `product` as found in `path`, merging with an existing entry.
pub fn record(map: &mut TriageMap, product: ProductInfo, path: Option<&Path>) {
    map.entry(product)
        .and_modify(|data| {
            if let Some(path) = path {
                data.paths.insert(path.to_path_buf());
            }
        })
        .or_insert_with(|| TriageData::new_found(path));
}

/// Merge `other` into `map`, unioning the contributing paths.
pub fn merge(map: &mut TriageMap, other: TriageMap) {
    for (product, data) in other {
        map.entry(product)
            .or_default()
            .paths
            .extend(data.paths);
    }
}
