//! Package URL encoding and decoding.
//!
//! Decoding keeps only the name, version and ecosystem: the PURL namespace
//! is not a reliable vendor, so a decoded PURL never carries one.
//!
//! `packageurl` normalizes some names per type. A `pypi` name is
//! lower-cased with `_` turned into `-`, so `my_pkg` comes back as `my-pkg`.

use crate::error::{IdentifierErrorKind, InventoryError, Result};
use crate::model::Ecosystem;
use packageurl::PackageUrl;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static PURL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<scheme>[^:/]+):(?P<type>[^/@]+)/(?:(?P<namespace>.+)/)?(?P<name>[^/@]+)@(?P<version>[^?#]+)(?:\?(?P<qualifiers>[^#]*))?(?:#(?P<subpath>.*))?$",
    )
    .expect("static regex")
});

/// Product and version recovered from a Package URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurlIdentity {
    pub product: String,
    pub version: String,
    /// `None` for types no manifest parser covers (`deb`, `generic`, ...)
    pub ecosystem: Option<Ecosystem>,
}

/// Check `purl` against `scheme:type/[namespace/]name@version[?qualifiers][#subpath]`.
#[must_use]
pub fn is_valid(purl: &str) -> bool {
    PURL_PATTERN.is_match(purl.trim())
}

/// Decode a Package URL into its product name and version.
pub fn decode(purl: &str) -> Result<PurlIdentity> {
    let purl = purl.trim();
    if !is_valid(purl) {
        return Err(malformed(purl, "expected scheme:type/namespace/name@version"));
    }

    let parsed = PackageUrl::from_str(purl).map_err(|e| malformed(purl, &e.to_string()))?;
    let version = parsed
        .version()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| malformed(purl, "missing version"))?;

    Ok(PurlIdentity {
        product: parsed.name().to_string(),
        version: version.to_string(),
        ecosystem: Ecosystem::from_purl_type(parsed.ty()),
    })
}

/// Encode a product/version pair as a Package URL of the given ecosystem.
///
/// The product is reduced to `[A-Za-z0-9._-]` and lower-cased, the version
/// to `[A-Za-z0-9.+-]`. Returns `None` when either becomes empty. No vendor
/// or namespace is ever embedded.
#[must_use]
pub fn encode(
    ecosystem: Ecosystem,
    product: &str,
    version: &str,
    qualifiers: &[(&str, &str)],
    subpath: Option<&str>,
) -> Option<String> {
    let product: String = product
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>()
        .to_lowercase();
    let version: String = version
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        .collect();
    if product.is_empty() || version.is_empty() {
        return None;
    }

    let mut purl = PackageUrl::new(ecosystem.purl_type(), product).ok()?;
    purl.with_version(version);
    for (key, value) in qualifiers {
        purl.add_qualifier(key.to_string(), value.to_string()).ok()?;
    }
    if let Some(subpath) = subpath.filter(|s| !s.is_empty()) {
        purl.with_subpath(subpath.to_string()).ok()?;
    }
    Some(purl.to_string())
}

fn malformed(purl: &str, reason: &str) -> InventoryError {
    InventoryError::identifier(
        "decoding package URL",
        IdentifierErrorKind::InvalidPurl {
            purl: purl.to_string(),
            reason: reason.to_string(),
        },
    )
}
