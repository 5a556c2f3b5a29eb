//! Java Maven `pom.xml` parser.
//!
//! Walks the XML events once, collecting the project coordinates, the parent
//! version, `<properties>` and every `<dependency>`. Version placeholders are
//! resolved after the walk since properties may follow the dependencies.

use super::{local_name, read_text, Fragments, ManifestKind, ManifestParser};
use crate::error::{ErrorContext, InventoryError, ManifestErrorKind, Result};
use crate::model::RawFragment;
use indexmap::IndexMap;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tracing::debug;

/// Placeholder expansion depth; properties referring to properties nest rarely.
const MAX_EXPANSIONS: usize = 8;

/// Parser for Maven project files
#[derive(Debug, Clone, Copy, Default)]
pub struct MavenPomParser;

#[derive(Debug, Default)]
struct PomDocument {
    artifact_id: Option<String>,
    version: Option<String>,
    parent_version: Option<String>,
    properties: IndexMap<String, String>,
    dependencies: Vec<(String, Option<String>)>,
}

impl PomDocument {
    /// The effective project version: its own, else the parent's.
    fn project_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.parent_version.as_deref())
    }

    /// Expand `${name}` placeholders. `None` when any stays unresolved.
    fn expand(&self, raw: &str) -> Option<String> {
        let mut value = raw.trim().to_string();
        for _ in 0..MAX_EXPANSIONS {
            let Some(start) = value.find("${") else {
                return Some(value);
            };
            let end = start + value[start..].find('}')?;
            let key = &value[start + 2..end];
            let replacement = match key {
                "project.version" | "pom.version" | "version" => {
                    self.project_version()?.to_string()
                }
                "project.parent.version" | "parent.version" => self.parent_version.clone()?,
                _ => self.properties.get(key)?.clone(),
            };
            value.replace_range(start..=end, &replacement);
        }
        (!value.contains("${")).then_some(value)
    }

    /// The project itself, then each dependency, in document order.
    fn into_fragments(mut self) -> impl Iterator<Item = RawFragment> + Send {
        let project = self
            .artifact_id
            .take()
            .map(|artifact| (artifact, self.project_version().map(str::to_string)));
        let dependencies = std::mem::take(&mut self.dependencies);

        project
            .into_iter()
            .chain(dependencies)
            .filter_map(move |(artifact, version)| {
                let Some(raw) = version.as_deref() else {
                    debug!(artifact = %artifact, "dependency without a version");
                    return None;
                };
                let Some(version) = self.expand(raw) else {
                    debug!(artifact = %artifact, version = raw, "unresolved version placeholder");
                    return None;
                };
                let fragment = RawFragment::new(artifact, version);
                fragment.is_complete().then_some(fragment)
            })
    }
}

/// Walk the POM and collect the values that identify artifacts.
fn read_pom(content: &str) -> Result<PomDocument> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut doc = PomDocument::default();
    let mut element_stack: Vec<String> = Vec::new();
    let mut current_text = String::new();
    let mut dependency: Option<(Option<String>, Option<String>)> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref());
                if name == "dependency" {
                    dependency = Some((None, None));
                }
                element_stack.push(name);
                current_text.clear();
            }
            Ok(Event::Text(ref e)) => {
                current_text = e.unescape().map(|t| t.into_owned()).unwrap_or_default();
            }
            Ok(Event::End(_)) => {
                let path: Vec<&str> = element_stack.iter().map(String::as_str).collect();
                let text = std::mem::take(&mut current_text);
                match path.as_slice() {
                    ["project", "artifactId"] => doc.artifact_id = Some(text),
                    ["project", "version"] => doc.version = Some(text),
                    ["project", "parent", "version"] => doc.parent_version = Some(text),
                    ["project", "properties", key] => {
                        doc.properties.insert((*key).to_string(), text);
                    }
                    [.., "dependency", "artifactId"] => {
                        if let Some(dep) = dependency.as_mut() {
                            dep.0 = Some(text);
                        }
                    }
                    [.., "dependency", "version"] => {
                        if let Some(dep) = dependency.as_mut() {
                            dep.1 = Some(text);
                        }
                    }
                    [.., "dependency"] => {
                        if let Some((Some(artifact), version)) = dependency.take() {
                            doc.dependencies.push((artifact, version));
                        }
                    }
                    _ => {}
                }
                element_stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(InventoryError::manifest(
                    format!("reading POM at position {}", reader.buffer_position()),
                    ManifestErrorKind::InvalidXml(e.to_string()),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(doc)
}

impl ManifestParser for MavenPomParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::MavenPom
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        let content = read_text(path)?;
        let doc = read_pom(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(Box::new(doc.into_fragments()))
    }
}
