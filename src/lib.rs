//! **Identify the open-source components a project ships.**
//!
//! `cve-inventory` turns dependency manifests, Python package metadata and
//! SBOM documents into a deduplicated list of `(vendor, product, version)`
//! identities, the keys a vulnerability database is queried with.
//!
//! ## Core Concepts & Modules
//!
//! - **[`parsers`]**: one decoder per lockfile or manifest grammar (npm,
//!   pip, Cargo, Bundler, Go modules, Composer, pub, SwiftPM, CPAN, Maven,
//!   renv), each yielding [`RawFragment`]s lazily.
//! - **[`sbom`]**: the [`SbomIngestor`] reads SPDX, CycloneDX and SWID
//!   documents, preferring CPE references over PURLs over declared names.
//! - **[`codec`]**: CPE 2.2 / 2.3 and Package URL decoding.
//! - **[`resolver`]**: the [`VendorResolver`] maps product names to vendors
//!   through an injected [`IdentityIndex`], with prefix stripping and
//!   hyphen-split fallbacks.
//! - **[`pipeline`]**: the [`Scanner`] walks a tree, decodes every file it
//!   recognises in parallel and folds the results into one [`TriageMap`].
//! - **[`config`]**: YAML configuration with discovery and CLI merging.
//!
//! ## Getting Started
//!
//! ```no_run
//! use cve_inventory::{AppConfig, StaticIndex};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = StaticIndex::load(Path::new("vendors.json"))?;
//!     let report = AppConfig::default().scanner(index).scan(Path::new("."));
//!
//!     for product in report.triage.keys() {
//!         println!("{product}");
//!     }
//!     for diagnostic in &report.diagnostics {
//!         eprintln!("{diagnostic}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Reading one SBOM
//!
//! ```no_run
//! use cve_inventory::{SbomIngestor, SbomType, StaticIndex, VendorResolver};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ingestor = SbomIngestor::new(VendorResolver::new(StaticIndex::new()));
//!     let triage = ingestor.ingest(Path::new("app.cdx.json"), SbomType::CycloneDx)?;
//!     println!("{} identities", triage.len());
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod resolver;
pub mod sbom;
pub mod utils;

pub use config::AppConfig;
pub use error::{InventoryError, Result};
pub use index::{IdentityIndex, StaticIndex};
pub use model::{ProductInfo, RawFragment, Remarks, TriageData, TriageMap, UNKNOWN_VENDOR};
pub use parsers::{ManifestKind, ManifestParser, ParserSet};
pub use pipeline::{Diagnostic, ScanReport, Scanner};
pub use resolver::VendorResolver;
pub use sbom::{SbomIngestor, SbomType};
