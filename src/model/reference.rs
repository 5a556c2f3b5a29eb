//! External identifiers attached to SBOM packages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier encodings an SBOM package can reference.
///
/// Variants are declared in preference order: when a package carries more
/// than one usable reference, the smallest kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RefKind {
    Cpe23,
    Cpe22,
    Purl,
}

impl RefKind {
    /// Classify an SPDX `referenceType` (or CycloneDX field name).
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.trim() {
            "cpe23Type" | "cpe23" => Some(Self::Cpe23),
            "cpe22Type" | "cpe22" => Some(Self::Cpe22),
            "purl" => Some(Self::Purl),
            _ => None,
        }
    }

    /// Guess the kind from the identifier text itself.
    ///
    /// Used for CycloneDX `cpe` fields, which carry either CPE flavour.
    #[must_use]
    pub fn sniff(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.starts_with("cpe:2.3:") {
            Some(Self::Cpe23)
        } else if raw.to_ascii_lowercase().starts_with("cpe:/") {
            Some(Self::Cpe22)
        } else if raw.starts_with("pkg:") {
            Some(Self::Purl)
        } else {
            None
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpe23 => write!(f, "cpe23Type"),
            Self::Cpe22 => write!(f, "cpe22Type"),
            Self::Purl => write!(f, "purl"),
        }
    }
}

/// One `(kind, raw)` identifier taken from an SBOM package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    pub kind: RefKind,
    pub raw: String,
}

impl ExternalReference {
    pub fn new(kind: RefKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}
