//! SPDX package extraction.
//!
//! Supports SPDX 2.x as JSON, YAML, tag-value, RDF/XML and plain XML. Only
//! the package name, `versionInfo` and external references are read.

use super::{unknown_format, Lenient, SbomPackage};
use crate::error::{InventoryError, ManifestErrorKind, Result};
use crate::parsers::local_name;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument {
    #[serde(default)]
    packages: Vec<Lenient<SpdxPackage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    name: Option<String>,
    version_info: Option<String>,
    #[serde(default)]
    external_refs: Vec<Lenient<SpdxExternalRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_type: Option<String>,
    reference_locator: Option<String>,
}

impl From<SpdxPackage> for SbomPackage {
    fn from(pkg: SpdxPackage) -> Self {
        let mut package = Self {
            name: pkg.name,
            version: pkg.version_info,
            ..Self::default()
        };
        for ext_ref in pkg.external_refs.into_iter().filter_map(Lenient::into_option) {
            // An incomplete reference names nothing to look up
            if let (Some(ref_type), Some(locator)) = (ext_ref.reference_type, ext_ref.reference_locator) {
                package.push_typed_reference(&ref_type, &locator);
            }
        }
        package
    }
}

/// Read the packages of an SPDX document in any supported serialization.
pub(super) fn read_packages(content: &str) -> Result<Vec<SbomPackage>> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    let doc: SpdxDocument = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed)?
    } else if trimmed.starts_with('<') {
        return read_xml(trimmed);
    } else if trimmed
        .lines()
        .any(|line| line.trim_start().starts_with("SPDXVersion:"))
    {
        return Ok(read_tag_value(trimmed));
    } else if trimmed.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("spdxVersion:") || line.starts_with("packages:")
    }) {
        serde_yaml::from_str(trimmed)?
    } else {
        return Err(unknown_format("not JSON, YAML, tag-value or XML SPDX"));
    };
    Ok(doc
        .packages
        .into_iter()
        .filter_map(Lenient::into_option)
        .map(SbomPackage::from)
        .collect())
}

/// Tag-value: a package starts at each `PackageName:` line.
fn read_tag_value(content: &str) -> Vec<SbomPackage> {
    let mut packages = Vec::new();
    let mut current: Option<SbomPackage> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "PackageName" => {
                if let Some(pkg) = current.take() {
                    packages.push(pkg);
                }
                current = Some(SbomPackage::new(value));
            }
            "PackageVersion" => {
                if let Some(ref mut pkg) = current {
                    pkg.version = Some(value.to_string());
                }
            }
            "ExternalRef" => {
                if let Some(ref mut pkg) = current {
                    // <category> <type> <locator>
                    let parts: Vec<&str> = value.split_whitespace().collect();
                    if let [_, ref_type, locator, ..] = parts.as_slice() {
                        pkg.push_typed_reference(ref_type, locator);
                    }
                }
            }
            // A file or snippet section closes the package
            "FileName" | "SnippetSPDXID" => {
                if let Some(pkg) = current.take() {
                    packages.push(pkg);
                }
            }
            _ => {}
        }
    }

    if let Some(pkg) = current {
        packages.push(pkg);
    }
    packages
}

/// Value of an `rdf:resource` attribute, if present.
fn resource_attr(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .filter_map(std::result::Result::ok)
        .find(|attr| local_name(attr.key.as_ref()) == "resource")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

#[derive(Debug, Default)]
struct PendingRef {
    ref_type: String,
    locator: String,
}

/// RDF/XML and plain XML share element local names: `Package` (RDF) or
/// `packages` (plain) holding `name`, `versionInfo` and `ExternalRef` /
/// `externalRefs` with `referenceType` and `referenceLocator`.
fn read_xml(content: &str) -> Result<Vec<SbomPackage>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut packages = Vec::new();
    let mut current_package: Option<SbomPackage> = None;
    let mut current_ref: Option<PendingRef> = None;
    let mut package_depth = 0usize;
    let mut depth = 0usize;
    let mut current_text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                current_text.clear();
                match local_name(e.name().as_ref()).as_str() {
                    "Package" | "packages" if current_package.is_none() => {
                        current_package = Some(SbomPackage::default());
                        package_depth = depth;
                    }
                    "ExternalRef" | "externalRefs" if current_package.is_some() => {
                        current_ref = Some(PendingRef::default());
                    }
                    "referenceType" => {
                        if let (Some(pending), Some(uri)) = (current_ref.as_mut(), resource_attr(e)) {
                            pending.ref_type = uri;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == "referenceType" {
                    if let (Some(pending), Some(uri)) = (current_ref.as_mut(), resource_attr(e)) {
                        pending.ref_type = uri;
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                current_text = e.unescape().map(|t| t.into_owned()).unwrap_or_default();
            }
            Ok(Event::End(ref e)) => {
                let name = local_name(e.name().as_ref());
                let text = std::mem::take(&mut current_text);
                match name.as_str() {
                    "Package" | "packages" if depth == package_depth => {
                        if let Some(pkg) = current_package.take() {
                            packages.push(pkg);
                        }
                    }
                    "ExternalRef" | "externalRefs" => {
                        if let (Some(pending), Some(pkg)) =
                            (current_ref.take(), current_package.as_mut())
                        {
                            pkg.push_typed_reference(&pending.ref_type, &pending.locator);
                        }
                    }
                    "referenceType" if !text.is_empty() => {
                        if let Some(pending) = current_ref.as_mut() {
                            pending.ref_type = text;
                        }
                    }
                    "referenceLocator" => {
                        if let Some(pending) = current_ref.as_mut() {
                            pending.locator = text;
                        }
                    }
                    // Only the package's own name, not that of a nested element
                    "name" if current_ref.is_none() && depth == package_depth + 1 => {
                        if let Some(pkg) = current_package.as_mut() {
                            pkg.name = Some(text);
                        }
                    }
                    "versionInfo" if depth == package_depth + 1 => {
                        if let Some(pkg) = current_package.as_mut() {
                            pkg.version = Some(text);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(InventoryError::manifest(
                    format!("reading SPDX XML at position {}", reader.buffer_position()),
                    ManifestErrorKind::InvalidXml(e.to_string()),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(packages)
}
