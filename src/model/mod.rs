//! Data model shared by the parsers, the resolver and the scanner.

mod ecosystem;
mod product;
mod reference;
pub mod triage;

pub use ecosystem::Ecosystem;
pub use product::{ProductInfo, RawFragment, UNKNOWN_VENDOR};
pub use reference::{ExternalReference, RefKind};
pub use triage::{Remarks, TriageData, TriageMap};
