//! SBOM ingestion: SPDX, CycloneDX and SWID documents to identities.
//!
//! Each format reader reduces a document to [`SbomPackage`]s. The ingestor
//! then picks one identity per package from its external references, in
//! [`RefKind`] order (CPE 2.3, CPE 2.2, PURL), falling back to the declared
//! name and version, and resolves vendors through the [`VendorResolver`].
//!
//! A PURL reference contributes only the version; its namespace is never
//! taken as a vendor.

mod cyclonedx;
mod spdx;
mod swid;
pub mod validation;

use crate::codec::{cpe, purl};
use crate::error::{InventoryError, ManifestErrorKind, Result};
use crate::index::IdentityIndex;
use crate::model::{triage, ExternalReference, RawFragment, RefKind, TriageMap};
use crate::parsers::read_text;
use crate::resolver::VendorResolver;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// SBOM document families
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SbomType {
    #[default]
    Spdx,
    #[value(name = "cyclonedx")]
    CycloneDx,
    Swid,
}

impl SbomType {
    /// Guess the document family from the opening text of a document.
    pub fn sniff(head: &str) -> Option<Self> {
        if head.contains("\"bomFormat\"") || head.contains("cyclonedx.org/schema") {
            Some(Self::CycloneDx)
        } else if head.contains("spdxVersion")
            || head.contains("SPDXVersion")
            || head.contains("spdx.org/rdf")
        {
            Some(Self::Spdx)
        } else if head.contains("SoftwareIdentity") {
            Some(Self::Swid)
        } else {
            None
        }
    }
}

impl fmt::Display for SbomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spdx => write!(f, "spdx"),
            Self::CycloneDx => write!(f, "cyclonedx"),
            Self::Swid => write!(f, "swid"),
        }
    }
}

/// One package as declared by an SBOM, before identity selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SbomPackage {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Explicit vendor, only SWID carries one outside a CPE
    pub vendor: Option<String>,
    pub references: Vec<ExternalReference>,
}

impl SbomPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, kind: RefKind, raw: impl Into<String>) -> Self {
        self.references.push(ExternalReference::new(kind, raw));
        self
    }

    /// Add a reference given as an SPDX `referenceType` name.
    ///
    /// Types other than `cpe23Type`, `cpe22Type` and `purl` are ignored.
    pub fn push_typed_reference(&mut self, type_name: &str, locator: &str) {
        let type_name = type_name.rsplit(['/', '#']).next().unwrap_or(type_name);
        if let Some(kind) = RefKind::from_type_name(type_name) {
            let locator = locator.trim();
            if !locator.is_empty() {
                self.references.push(ExternalReference::new(kind, locator));
            }
        }
    }

    /// Add a CycloneDX `cpe` or `purl` field, classifying it by its text.
    pub fn push_sniffed_reference(&mut self, raw: &str) {
        if let Some(kind) = RefKind::sniff(raw) {
            self.references
                .push(ExternalReference::new(kind, raw.trim()));
        }
    }
}

/// One element of a JSON or YAML list, dropped when it does not decode.
///
/// Keeps a single malformed package or reference from failing the whole
/// document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Parsed(T),
    Skipped(serde::de::IgnoredAny),
}

impl<T> Lenient<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Skipped(_) => {
                debug!("skipping malformed SBOM list entry");
                None
            }
        }
    }
}

/// `(vendor, product, version)` decoded from one reference; any part may be
/// absent.
#[derive(Debug, Default)]
struct DecodedReference {
    vendor: Option<String>,
    product: Option<String>,
    version: Option<String>,
}

/// Decode a reference that passes its grammar check, else `None`.
fn decode_reference(reference: &ExternalReference) -> Option<DecodedReference> {
    let raw = reference.raw.as_str();
    let decoded = match reference.kind {
        RefKind::Cpe23 => cpe::decode_cpe23(raw).map(|id| DecodedReference {
            vendor: id.vendor,
            product: id.product,
            version: id.version,
        }),
        RefKind::Cpe22 => cpe::decode_cpe22(raw).map(|id| DecodedReference {
            vendor: id.vendor,
            product: id.product,
            version: id.version,
        }),
        RefKind::Purl => purl::decode(raw).map(|id| DecodedReference {
            version: Some(id.version),
            ..DecodedReference::default()
        }),
    };
    match decoded {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!(reference = raw, error = %e, "ignoring invalid reference");
            None
        }
    }
}

/// Choose the identity of one package.
///
/// The best valid reference supplies what it can; the declared name and
/// version fill the gaps. `None` when no version is known.
fn select_identity(package: &SbomPackage) -> Option<RawFragment> {
    let mut references: Vec<&ExternalReference> = package.references.iter().collect();
    references.sort_by_key(|r| r.kind);
    let decoded = references
        .into_iter()
        .find_map(decode_reference)
        .unwrap_or_default();

    let Some(product) = decoded.product.or_else(|| package.name.clone()) else {
        debug!(?package, "package without a name");
        return None;
    };
    let Some(version) = decoded.version.or_else(|| package.version.clone()) else {
        debug!(product = %product, "no version found for package");
        return None;
    };

    let fragment = RawFragment::new(product.to_lowercase(), version);
    match decoded.vendor.or_else(|| package.vendor.clone()) {
        Some(vendor) => Some(fragment.with_vendor(vendor)),
        None => Some(fragment),
    }
}

/// Turns SBOM documents into a triage map.
#[derive(Debug, Clone)]
pub struct SbomIngestor<I> {
    resolver: VendorResolver<I>,
    validate: bool,
}

impl<I: IdentityIndex> SbomIngestor<I> {
    pub fn new(resolver: VendorResolver<I>) -> Self {
        Self {
            resolver,
            validate: true,
        }
    }

    /// Enable or disable structural validation of XML documents.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn resolver(&self) -> &VendorResolver<I> {
        &self.resolver
    }

    /// Read the packages of a document.
    ///
    /// Validation applies to `.xml` files only; a document that fails it
    /// yields a `ValidationFailure`.
    pub fn packages(&self, path: &Path, sbom_type: SbomType) -> Result<Vec<SbomPackage>> {
        let content = read_text(path)?;
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));

        if self.validate && (is_xml || sbom_type == SbomType::Swid) {
            match sbom_type {
                SbomType::Spdx => validation::validate_spdx_xml(&content)?,
                SbomType::CycloneDx => validation::validate_cyclonedx_xml(&content)?,
                SbomType::Swid => validation::validate_swid(&content)?,
            }
        }

        parse_packages_str(&content, sbom_type, is_xml)
    }

    /// Identities declared by the document at `path`.
    pub fn ingest(&self, path: &Path, sbom_type: SbomType) -> Result<TriageMap> {
        debug!(path = %path.display(), %sbom_type, "processing SBOM");
        let packages = self.packages(path, sbom_type)?;
        debug!(count = packages.len(), "packages identified in SBOM");

        let mut map = TriageMap::new();
        for fragment in packages.iter().filter_map(select_identity) {
            for product in self.resolver.resolve(&fragment) {
                triage::record(&mut map, product, Some(path));
            }
        }
        Ok(map)
    }

    /// Like [`ingest`](Self::ingest), logging failures and returning an
    /// empty map instead.
    pub fn ingest_or_empty(&self, path: &Path, sbom_type: SbomType) -> TriageMap {
        match self.ingest(path, sbom_type) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping SBOM");
                TriageMap::new()
            }
        }
    }
}

/// Read the packages of an in-memory document, without validation.
///
/// `xml_hint` marks content that came from an `.xml` file.
pub fn parse_packages_str(
    content: &str,
    sbom_type: SbomType,
    xml_hint: bool,
) -> Result<Vec<SbomPackage>> {
    match sbom_type {
        SbomType::Spdx => spdx::read_packages(content),
        SbomType::CycloneDx => cyclonedx::read_packages(content, xml_hint),
        SbomType::Swid => swid::read_packages(content),
    }
}

/// Error for a document whose top-level shape matches no known serialization.
pub(crate) fn unknown_format(what: &str) -> InventoryError {
    InventoryError::manifest(
        "detecting SBOM serialization",
        ManifestErrorKind::UnknownFormat(what.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::StaticIndex;
    use crate::model::ProductInfo;

    fn ingestor() -> SbomIngestor<StaticIndex> {
        let index = StaticIndex::new()
            .with("zstandard", "facebook")
            .with("openssl", "openssl");
        SbomIngestor::new(VendorResolver::new(index))
    }

    #[test]
    fn test_sniff_document_family() {
        assert_eq!(
            SbomType::sniff(r#"{"bomFormat": "CycloneDX", "specVersion": "1.5"}"#),
            Some(SbomType::CycloneDx)
        );
        assert_eq!(
            SbomType::sniff(r#"{"spdxVersion": "SPDX-2.3"}"#),
            Some(SbomType::Spdx)
        );
        assert_eq!(
            SbomType::sniff("<SoftwareIdentity name=\"x\" version=\"1\">"),
            Some(SbomType::Swid)
        );
        assert_eq!(SbomType::sniff("{}"), None);
    }

    #[test]
    fn test_incomplete_spdx_reference_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.spdx.json");
        std::fs::write(
            &path,
            r#"{
                "spdxVersion": "SPDX-2.3",
                "packages": [
                    {"name": "zstandard", "versionInfo": "0.18.0"},
                    {"name": "mystery", "versionInfo": "1.0",
                     "externalRefs": [{"referenceCategory": "SECURITY",
                                       "referenceLocator": "cpe:2.3:a:x:y:1.0:*:*:*:*:*:*:*"}]}
                ]
            }"#,
        )
        .unwrap();
        let map = ingestor().ingest(&path, SbomType::Spdx).unwrap();
        let zstandard = ProductInfo::try_new("facebook", "zstandard", "0.18.0").unwrap();
        assert!(map.contains_key(&zstandard));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_cpe23_beats_purl_and_declared_values() {
        let package = SbomPackage::new("libz")
            .with_version("0.0.1")
            .with_reference(RefKind::Purl, "pkg:generic/zlib@1.2.11")
            .with_reference(
                RefKind::Cpe23,
                "cpe:2.3:a:zlib:zlib:1.2.13:*:*:*:*:*:*:*",
            );
        let fragment = select_identity(&package).unwrap();
        assert_eq!(fragment.product, "zlib");
        assert_eq!(fragment.version, "1.2.13");
        assert_eq!(fragment.vendor_hint.as_deref(), Some("zlib"));
    }

    #[test]
    fn test_cpe22_beats_purl() {
        let package = SbomPackage::new("curl")
            .with_reference(RefKind::Purl, "pkg:generic/curl@7.0.0")
            .with_reference(RefKind::Cpe22, "cpe:/a:haxx:curl:7.88.1");
        let fragment = select_identity(&package).unwrap();
        assert_eq!(fragment.vendor_hint.as_deref(), Some("haxx"));
        assert_eq!(fragment.version, "7.88.1");
    }

    #[test]
    fn test_purl_contributes_version_only() {
        let package = SbomPackage::new("Flask")
            .with_version("0.1")
            .with_reference(RefKind::Purl, "pkg:pypi/pallets/flask@2.2.3");
        let fragment = select_identity(&package).unwrap();
        assert_eq!(fragment.product, "flask");
        assert_eq!(fragment.version, "2.2.3");
        assert_eq!(fragment.vendor_hint, None);
    }

    #[test]
    fn test_invalid_reference_is_ignored() {
        let package = SbomPackage::new("openssl")
            .with_version("3.0.8")
            .with_reference(RefKind::Cpe23, "cpe:2.3:not-a-cpe");
        let fragment = select_identity(&package).unwrap();
        assert_eq!(fragment.version, "3.0.8");
        assert_eq!(fragment.vendor_hint, None);
    }

    #[test]
    fn test_package_without_version_is_skipped() {
        assert!(select_identity(&SbomPackage::new("nameless-version")).is_none());
    }

    #[test]
    fn test_cpe_without_version_falls_back_to_declared() {
        let package = SbomPackage::new("busybox")
            .with_version("1.36.0")
            .with_reference(RefKind::Cpe23, "cpe:2.3:a:busybox:busybox:*:*:*:*:*:*:*:*");
        let fragment = select_identity(&package).unwrap();
        assert_eq!(fragment.version, "1.36.0");
        assert_eq!(fragment.vendor_hint.as_deref(), Some("busybox"));
    }

    #[test]
    fn test_push_typed_reference() {
        let mut package = SbomPackage::new("x");
        package.push_typed_reference("cpe23Type", "cpe:2.3:a:x:x:1:*:*:*:*:*:*:*");
        package.push_typed_reference("http://spdx.org/rdf/references/purl", "pkg:npm/x@1");
        package.push_typed_reference("swh", "swh:1:cnt:abc");
        let kinds: Vec<_> = package.references.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RefKind::Cpe23, RefKind::Purl]);
    }

    #[test]
    fn test_ingest_spdx_json_resolves_vendor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.spdx.json");
        std::fs::write(
            &path,
            r#"{"spdxVersion": "SPDX-2.3", "packages": [
                {"name": "zstandard", "versionInfo": "0.18.0"},
                {"name": "no-version"}
            ]}"#,
        )
        .unwrap();

        let map = ingestor().ingest(&path, SbomType::Spdx).unwrap();
        let expected = ProductInfo::try_new("facebook", "zstandard", "0.18.0").unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![&expected]);
        assert!(map[&expected].paths.contains(&path));
    }

    #[test]
    fn test_ingest_or_empty_on_missing_file() {
        let map = ingestor().ingest_or_empty(Path::new("/nonexistent/bom.json"), SbomType::CycloneDx);
        assert!(map.is_empty());
    }
}
