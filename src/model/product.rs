//! Normalized identities and the raw fragments they are resolved from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor assigned when no index entry matches a product.
pub const UNKNOWN_VENDOR: &str = "UNKNOWN";

/// A normalized `(vendor, product, version)` identity.
///
/// Vendor and product are lower-cased at construction; the version keeps its
/// original casing. Values are immutable once built and are used directly as
/// map keys in the triage aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductInfo {
    vendor: String,
    product: String,
    version: String,
}

impl ProductInfo {
    /// Build an identity, returning `None` when the product or version is
    /// empty after trimming. An empty vendor becomes [`UNKNOWN_VENDOR`].
    pub fn try_new(vendor: &str, product: &str, version: &str) -> Option<Self> {
        let product = product.trim();
        let version = version.trim();
        if product.is_empty() || version.is_empty() {
            return None;
        }

        let vendor = vendor.trim();
        let vendor = if vendor.is_empty() || vendor.eq_ignore_ascii_case(UNKNOWN_VENDOR) {
            UNKNOWN_VENDOR.to_string()
        } else {
            vendor.to_lowercase()
        };

        Some(Self {
            vendor,
            product: product.to_lowercase(),
            version: version.to_string(),
        })
    }

    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether no index entry supplied a vendor for this identity.
    #[must_use]
    pub fn has_unknown_vendor(&self) -> bool {
        self.vendor == UNKNOWN_VENDOR
    }
}

impl fmt::Display for ProductInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.vendor, self.product, self.version)
    }
}

/// A product/version pair as it appears in a manifest, before vendor
/// resolution.
///
/// `vendor_hint` is only set when the source itself carried an explicit
/// vendor (a CPE, a SWID link or an SBOM supplier field).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawFragment {
    pub product: String,
    pub version: String,
    pub vendor_hint: Option<String>,
}

impl RawFragment {
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
            vendor_hint: None,
        }
    }

    /// Attach an explicit vendor taken from the source document.
    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        let vendor = vendor.into();
        self.vendor_hint = if vendor.trim().is_empty() {
            None
        } else {
            Some(vendor)
        };
        self
    }

    /// True when both halves of the pair carry text.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.product.trim().is_empty() && !self.version.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_info_lowercases_vendor_and_product() {
        let info = ProductInfo::try_new("Facebook", "ZStandard", "0.18.0-RC1").unwrap();
        assert_eq!(info.vendor(), "facebook");
        assert_eq!(info.product(), "zstandard");
        assert_eq!(info.version(), "0.18.0-RC1");
    }

    #[test]
    fn test_product_info_rejects_empty_fields() {
        assert!(ProductInfo::try_new("vendor", "", "1.0").is_none());
        assert!(ProductInfo::try_new("vendor", "product", "  ").is_none());
    }

    #[test]
    fn test_empty_vendor_becomes_unknown() {
        let info = ProductInfo::try_new("", "left-pad", "1.3.0").unwrap();
        assert!(info.has_unknown_vendor());
        assert_eq!(info.to_string(), "UNKNOWN,left-pad,1.3.0");
    }

    #[test]
    fn test_fragment_blank_vendor_hint_is_dropped() {
        let fragment = RawFragment::new("zlib", "1.2.13").with_vendor("   ");
        assert_eq!(fragment.vendor_hint, None);
        assert!(fragment.is_complete());
        assert!(!RawFragment::new("zlib", "").is_complete());
    }
}
