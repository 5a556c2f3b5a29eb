//! CycloneDX component extraction.
//!
//! Supports CycloneDX 1.x in JSON and XML. Nested components are flattened
//! depth-first; the `cpe` and `purl` fields become external references.

use super::{unknown_format, Lenient, SbomPackage};
use crate::error::{ErrorContext, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom {
    #[serde(default)]
    components: Vec<Lenient<CdxComponent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CdxComponent {
    name: Option<String>,
    version: Option<String>,
    purl: Option<String>,
    cpe: Option<String>,
    #[serde(default)]
    components: Vec<Lenient<CdxComponent>>,
}

// XML wraps collections in an extra element (<components><component>...)

#[derive(Debug, Default, Deserialize)]
#[serde(rename = "bom")]
struct CycloneDxBomXml {
    components: Option<CdxComponentsXml>,
}

#[derive(Debug, Default, Deserialize)]
struct CdxComponentsXml {
    #[serde(rename = "component", default)]
    component: Vec<CdxComponentXml>,
}

#[derive(Debug, Deserialize)]
struct CdxComponentXml {
    name: Option<String>,
    version: Option<String>,
    purl: Option<String>,
    cpe: Option<String>,
    components: Option<CdxComponentsXml>,
}

/// Field values common to both serializations.
struct ComponentFields<'a> {
    name: Option<&'a String>,
    version: Option<&'a String>,
    purl: Option<&'a String>,
    cpe: Option<&'a String>,
}

impl ComponentFields<'_> {
    fn to_package(&self) -> SbomPackage {
        let mut package = SbomPackage {
            name: self.name.cloned(),
            version: self.version.cloned(),
            ..SbomPackage::default()
        };
        // CPE first so that file order matches preference order
        for raw in [self.cpe, self.purl].into_iter().flatten() {
            package.push_sniffed_reference(raw);
        }
        package
    }
}

fn flatten_json(components: Vec<Lenient<CdxComponent>>, out: &mut Vec<SbomPackage>) {
    for component in components.into_iter().filter_map(Lenient::into_option) {
        out.push(
            ComponentFields {
                name: component.name.as_ref(),
                version: component.version.as_ref(),
                purl: component.purl.as_ref(),
                cpe: component.cpe.as_ref(),
            }
            .to_package(),
        );
        flatten_json(component.components, out);
    }
}

fn flatten_xml(components: &CdxComponentsXml, out: &mut Vec<SbomPackage>) {
    for component in &components.component {
        out.push(
            ComponentFields {
                name: component.name.as_ref(),
                version: component.version.as_ref(),
                purl: component.purl.as_ref(),
                cpe: component.cpe.as_ref(),
            }
            .to_package(),
        );
        if let Some(nested) = &component.components {
            flatten_xml(nested, out);
        }
    }
}

/// Read the components of a CycloneDX document.
///
/// `xml_hint` comes from the file extension; the content itself decides when
/// it clearly is one or the other.
pub(super) fn read_packages(content: &str, xml_hint: bool) -> Result<Vec<SbomPackage>> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    let mut packages = Vec::new();

    if trimmed.starts_with('{') {
        let bom: CycloneDxBom = serde_json::from_str(trimmed).context("parsing CycloneDX JSON")?;
        flatten_json(bom.components, &mut packages);
    } else if trimmed.starts_with('<') || xml_hint {
        let bom: CycloneDxBomXml =
            quick_xml::de::from_str(trimmed).context("parsing CycloneDX XML")?;
        if let Some(components) = &bom.components {
            flatten_xml(components, &mut packages);
        }
    } else {
        return Err(unknown_format("not JSON or XML CycloneDX"));
    }

    Ok(packages)
}
