//! In-memory product/vendor index.

use super::IdentityIndex;
use crate::error::{ErrorContext, InventoryError, ManifestErrorKind, Result};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::path::Path;

/// Product/vendor index held entirely in memory.
///
/// Mapping files are either `{product: vendor}` or `{product: [vendor, ...]}`
/// in JSON or YAML. Keys are lower-cased on load.
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    entries: IndexMap<String, IndexSet<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VendorList {
    One(String),
    Many(Vec<String>),
}

impl StaticIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `product -> vendor` pair. Later vendors keep insertion order.
    pub fn insert(&mut self, product: &str, vendor: &str) {
        let product = product.trim().to_lowercase();
        let vendor = vendor.trim().to_lowercase();
        if product.is_empty() || vendor.is_empty() {
            return;
        }
        self.entries.entry(product).or_default().insert(vendor);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, product: &str, vendor: &str) -> Self {
        self.insert(product, vendor);
        self
    }

    /// Load an index file, picking the syntax from the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| InventoryError::io(path, e))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.with_context(|| format!("loading index {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: IndexMap<String, VendorList> = serde_json::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(InventoryError::manifest(
                "index file",
                ManifestErrorKind::InvalidYaml("empty document".to_string()),
            ));
        }
        let raw: IndexMap<String, VendorList> = serde_yaml::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: IndexMap<String, VendorList>) -> Self {
        let mut index = Self::new();
        for (product, vendors) in raw {
            match vendors {
                VendorList::One(vendor) => index.insert(&product, &vendor),
                VendorList::Many(vendors) => {
                    for vendor in vendors {
                        index.insert(&product, &vendor);
                    }
                }
            }
        }
        index
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IdentityIndex for StaticIndex {
    fn lookup_vendors(&self, product: &str) -> IndexSet<String> {
        self.entries
            .get(&product.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}
