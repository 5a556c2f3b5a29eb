//! Vendor resolution for raw product/version pairs.
//!
//! Resolution order for a [`RawFragment`]:
//!
//! 1. an incomplete pair resolves to nothing
//! 2. an explicit vendor hint is taken as-is
//! 3. the lower-cased product is looked up in the [`IdentityIndex`]
//! 4. the first matching packaging prefix (`python-`, `rust-`, ...) is
//!    stripped and the remainder looked up
//! 5. the full product is split on `-` and every segment looked up
//! 6. otherwise the vendor is [`UNKNOWN_VENDOR`]
//!
//! Output order follows index order, then segment order, without duplicates.

use crate::index::IdentityIndex;
use crate::model::{ProductInfo, RawFragment, UNKNOWN_VENDOR};
use indexmap::IndexSet;
use tracing::debug;

/// Distribution packaging prefixes stripped before a second lookup.
pub const COMMON_PREFIXES: &[&str] = &[
    "perl-", "golang-", "rubygem-", "python-", "py3-", "python3-", "python2-", "rust-",
    "nodejs-",
];

/// Resolves raw fragments into identities using an injected index.
#[derive(Debug, Clone)]
pub struct VendorResolver<I> {
    index: I,
    split_hyphens: bool,
}

impl<I: IdentityIndex> VendorResolver<I> {
    pub fn new(index: I) -> Self {
        Self {
            index,
            split_hyphens: true,
        }
    }

    /// Enable or disable the hyphen-split fallback (step 5).
    #[must_use]
    pub fn with_hyphen_split(mut self, enabled: bool) -> Self {
        self.split_hyphens = enabled;
        self
    }

    /// Access the underlying index
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Vendors known for `product`, in index order.
    ///
    /// Applies the prefix and hyphen-split fallbacks. Returns an empty set
    /// rather than `UNKNOWN` when nothing matches.
    pub fn vendors_for(&self, product: &str) -> IndexSet<String> {
        self.candidates(&product.to_lowercase())
            .into_iter()
            .map(|(vendor, _)| vendor)
            .collect()
    }

    /// Resolve one fragment into zero or more identities.
    pub fn resolve(&self, fragment: &RawFragment) -> Vec<ProductInfo> {
        let product = fragment.product.trim();
        let version = fragment.version.trim();
        if product.is_empty() || version.is_empty() {
            debug!(
                product = %fragment.product,
                version = %fragment.version,
                "dropping fragment without product or version"
            );
            return Vec::new();
        }

        if let Some(vendor) = &fragment.vendor_hint {
            return ProductInfo::try_new(vendor, product, version)
                .into_iter()
                .collect();
        }

        let lowered = product.to_lowercase();
        let candidates = self.candidates(&lowered);
        if candidates.is_empty() {
            return ProductInfo::try_new(UNKNOWN_VENDOR, product, version)
                .into_iter()
                .collect();
        }

        let mut seen = IndexSet::new();
        for (vendor, name) in candidates {
            if let Some(info) = ProductInfo::try_new(&vendor, &name, version) {
                seen.insert(info);
            }
        }
        seen.into_iter().collect()
    }

    /// `(vendor, product)` candidates for a lower-cased product name.
    fn candidates(&self, product: &str) -> IndexSet<(String, String)> {
        let direct = self.index.lookup_vendors(product);
        if !direct.is_empty() {
            return direct
                .into_iter()
                .map(|vendor| (vendor, product.to_string()))
                .collect();
        }

        if let Some(prefix) = COMMON_PREFIXES.iter().find(|p| product.starts_with(**p)) {
            let stripped = &product[prefix.len()..];
            if !stripped.is_empty() {
                let hits = self.index.lookup_vendors(stripped);
                if !hits.is_empty() {
                    return hits
                        .into_iter()
                        .map(|vendor| (vendor, stripped.to_string()))
                        .collect();
                }
            }
        }

        let mut hits = IndexSet::new();
        if self.split_hyphens && product.contains('-') {
            for segment in product.split('-').filter(|s| !s.is_empty()) {
                for vendor in self.index.lookup_vendors(segment) {
                    hits.insert((vendor, segment.to_string()));
                }
            }
            if !hits.is_empty() {
                debug!(
                    product,
                    matches = hits.len(),
                    "resolved product through hyphen-split heuristic"
                );
            }
        }
        hits
    }
}
