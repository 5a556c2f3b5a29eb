//! Structural validation of XML SBOM documents.
//!
//! Checks that a document is well-formed, that its root element and
//! namespace match the format, and that every package element names its
//! package. This is not XSD validation; no schema bundle is shipped.

use crate::error::{InventoryError, OptionContext, Result};
use crate::parsers::local_name;
use indexmap::{IndexMap, IndexSet};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Namespace prefix of every CycloneDX schema version.
pub const CYCLONEDX_NAMESPACE: &str = "http://cyclonedx.org/schema/bom/";
/// Namespace of the SPDX RDF vocabulary.
pub const SPDX_RDF_NAMESPACE: &str = "http://spdx.org/rdf/terms";
/// Namespace of ISO/IEC 19770-2:2015 SWID tags.
pub const SWID_NAMESPACE: &str = "http://standards.iso.org/iso/19770/-2/2015/schema.xsd";

/// What a single pass over a document learned about its shape.
#[derive(Debug, Default)]
struct Outline {
    root: Option<String>,
    root_attrs: IndexMap<String, String>,
    elements: IndexSet<String>,
    /// Package elements with no `name` child
    unnamed_packages: usize,
}

impl Outline {
    fn declares_namespace(&self, prefix: &str) -> bool {
        self.root_attrs
            .iter()
            .any(|(key, value)| key.starts_with("xmlns") && value.starts_with(prefix))
    }
}

fn attrs_of(e: &BytesStart<'_>) -> IndexMap<String, String> {
    e.attributes()
        .filter_map(std::result::Result::ok)
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                String::from_utf8_lossy(&attr.value).to_string(),
            )
        })
        .collect()
}

/// Walk the whole document once.
///
/// `package_elements` are the local names whose instances must carry a
/// `name` child element.
fn outline(content: &str, package_elements: &[&str]) -> Result<Outline> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut outline = Outline::default();
    // (depth, has_name) for each open package element
    let mut open_packages: Vec<(usize, bool)> = Vec::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref());
                if outline.root.is_none() {
                    outline.root = Some(name.clone());
                    outline.root_attrs = attrs_of(e);
                }
                depth += 1;
                if name == "name" {
                    if let Some((pkg_depth, has_name)) = open_packages.last_mut() {
                        if *pkg_depth + 1 == depth {
                            *has_name = true;
                        }
                    }
                }
                if package_elements.contains(&name.as_str()) {
                    open_packages.push((depth, false));
                }
                outline.elements.insert(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = local_name(e.name().as_ref());
                if outline.root.is_none() {
                    outline.root = Some(name.clone());
                    outline.root_attrs = attrs_of(e);
                }
                if package_elements.contains(&name.as_str()) {
                    outline.unnamed_packages += 1;
                }
                outline.elements.insert(name);
            }
            Ok(Event::End(ref e)) => {
                let name = local_name(e.name().as_ref());
                if package_elements.contains(&name.as_str()) {
                    if let Some((_, has_name)) = open_packages.pop() {
                        if !has_name {
                            outline.unnamed_packages += 1;
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(InventoryError::validation(format!(
                    "not well-formed XML at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(InventoryError::validation(format!(
            "document ends with {depth} unclosed element(s)"
        )));
    }
    Ok(outline)
}

fn expect_root(outline: &Outline, expected: &[&str], format: &str) -> Result<()> {
    let root = outline
        .root
        .as_deref()
        .context_none("document has no root element")?;
    if expected.contains(&root) {
        Ok(())
    } else {
        Err(InventoryError::validation(format!(
            "root element <{root}> is not a {format} document"
        )))
    }
}

fn expect_named_packages(outline: &Outline, what: &str) -> Result<()> {
    match outline.unnamed_packages {
        0 => Ok(()),
        n => Err(InventoryError::validation(format!("{n} {what} element(s) without a name"))),
    }
}

/// Validate an SPDX RDF/XML or plain XML document.
pub fn validate_spdx_xml(content: &str) -> Result<()> {
    let outline = outline(content, &["Package", "packages"])?;
    expect_root(&outline, &["RDF", "Document", "SpdxDocument"], "SPDX")?;
    if outline.root.as_deref() == Some("RDF") {
        if !outline.declares_namespace(SPDX_RDF_NAMESPACE) {
            return Err(InventoryError::validation(
                "RDF document does not declare the SPDX namespace",
            ));
        }
        if !outline.elements.contains("SpdxDocument") {
            return Err(InventoryError::validation("RDF document has no SpdxDocument"));
        }
    }
    expect_named_packages(&outline, "package")
}

/// Validate a CycloneDX XML document.
pub fn validate_cyclonedx_xml(content: &str) -> Result<()> {
    let outline = outline(content, &["component"])?;
    expect_root(&outline, &["bom"], "CycloneDX")?;
    if !outline.declares_namespace(CYCLONEDX_NAMESPACE) {
        return Err(InventoryError::validation(
            "bom element does not declare a CycloneDX namespace",
        ));
    }
    expect_named_packages(&outline, "component")
}

/// Validate a SWID tag.
pub fn validate_swid(content: &str) -> Result<()> {
    let outline = outline(content, &[])?;
    expect_root(&outline, &["SoftwareIdentity"], "SWID")?;
    if !outline.declares_namespace(SWID_NAMESPACE) {
        return Err(InventoryError::validation(
            "SoftwareIdentity does not declare the ISO 19770-2 namespace",
        ));
    }
    for required in ["name", "tagId"] {
        if !outline.root_attrs.contains_key(required) {
            return Err(InventoryError::validation(format!(
                "SoftwareIdentity is missing the {required} attribute"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclonedx() {
        let valid = r#"<bom xmlns="http://cyclonedx.org/schema/bom/1.5"><components>
            <component type="library"><name>zlib</name><version>1.2.13</version></component>
        </components></bom>"#;
        assert!(validate_cyclonedx_xml(valid).is_ok());

        let no_namespace = r#"<bom><components/></bom>"#;
        assert!(validate_cyclonedx_xml(no_namespace).is_err());

        let unnamed = r#"<bom xmlns="http://cyclonedx.org/schema/bom/1.5"><components>
            <component type="library"><version>1.0</version></component>
        </components></bom>"#;
        assert!(validate_cyclonedx_xml(unnamed).is_err());

        let nested_name_only = r#"<bom xmlns="http://cyclonedx.org/schema/bom/1.5"><components>
            <component><supplier><name>acme</name></supplier></component>
        </components></bom>"#;
        assert!(validate_cyclonedx_xml(nested_name_only).is_err());
    }

    #[test]
    fn test_spdx() {
        let plain = "<Document><packages><name>zstandard</name></packages></Document>";
        assert!(validate_spdx_xml(plain).is_ok());

        let rdf = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
            xmlns:spdx="http://spdx.org/rdf/terms#">
            <spdx:SpdxDocument><spdx:name>d</spdx:name></spdx:SpdxDocument></rdf:RDF>"#;
        assert!(validate_spdx_xml(rdf).is_ok());

        assert!(validate_spdx_xml("<bom/>").is_err());
        assert!(validate_spdx_xml("<Document><packages>").is_err());
    }

    #[test]
    fn test_swid() {
        let valid = r#"<SoftwareIdentity xmlns="http://standards.iso.org/iso/19770/-2/2015/schema.xsd"
            name="demo" tagId="demo-1"><Link rel="component" href="swid:a-b-1"/></SoftwareIdentity>"#;
        assert!(validate_swid(valid).is_ok());

        let missing_tag_id = r#"<SoftwareIdentity xmlns="http://standards.iso.org/iso/19770/-2/2015/schema.xsd" name="demo"/>"#;
        assert!(validate_swid(missing_tag_id).is_err());
    }

    #[test]
    fn test_not_xml() {
        assert!(validate_swid("").is_err());
        assert!(validate_cyclonedx_xml("{\"bomFormat\": \"CycloneDX\"}").is_err());
    }
}
