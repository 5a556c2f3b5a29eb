//! SWID tag component extraction.
//!
//! Components are the root's `<Link rel="component" href="...">` children,
//! whose `href` reads `<scheme>:<vendor>-<product>-<version>`.

use super::SbomPackage;
use crate::error::{InventoryError, ManifestErrorKind, Result};
use crate::parsers::local_name;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// Split a component `href` into vendor, product and version.
///
/// A leading `v`/`V` on the version is dropped.
fn parse_href(href: &str) -> Option<SbomPackage> {
    let href = href.replace("%20", " ");
    let body = href.split_once(':').map_or(href.as_str(), |(_, rest)| rest);
    let mut items = body.split('-');
    let vendor = items.next()?.trim_matches(' ');
    let product = items.next()?;
    let version = items.next()?;
    let version = version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version);

    Some(SbomPackage {
        name: Some(product.to_string()),
        version: Some(version.to_string()),
        vendor: (!vendor.is_empty()).then(|| vendor.to_string()),
        references: Vec::new(),
    })
}

/// `(rel, href)` attributes of a `Link` element.
fn link_attrs(e: &BytesStart<'_>) -> (Option<String>, Option<String>) {
    let mut rel = None;
    let mut href = None;
    for attr in e.attributes().filter_map(std::result::Result::ok) {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
        match local_name(attr.key.as_ref()).as_str() {
            "rel" => rel = Some(value),
            "href" => href = Some(value),
            _ => {}
        }
    }
    (rel, href)
}

/// Read the component links of a SWID tag.
///
/// A component link without an `href` makes the whole tag unusable.
pub(super) fn read_packages(content: &str) -> Result<Vec<SbomPackage>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut packages = Vec::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        let (element, is_start) = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => (Some(e.into_owned()), true),
            Ok(Event::Empty(e)) => (Some(e.into_owned()), false),
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                (None, false)
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(InventoryError::manifest(
                    format!("reading SWID tag at position {}", reader.buffer_position()),
                    ManifestErrorKind::InvalidXml(e.to_string()),
                ))
            }
            _ => (None, false),
        };

        if let Some(e) = element {
            // Direct children of the root sit at depth 1
            if depth == 1 && local_name(e.name().as_ref()) == "Link" {
                let (rel, href) = link_attrs(&e);
                if rel.as_deref() == Some("component") {
                    let Some(href) = href.filter(|h| !h.is_empty()) else {
                        return Err(InventoryError::missing_field("href", "SWID component Link"));
                    };
                    match parse_href(&href) {
                        Some(package) => packages.push(package),
                        None => debug!(href = %href, "component link is not vendor-product-version"),
                    }
                }
            }
            if is_start {
                depth += 1;
            }
        }
        buf.clear();
    }

    Ok(packages)
}
