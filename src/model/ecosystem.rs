//! Package ecosystems covered by the manifest parsers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ecosystem/package manager a manifest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    PyPi,
    Cargo,
    RubyGems,
    Golang,
    Composer,
    Pub,
    Swift,
    Cpan,
    Maven,
    Cran,
}

impl Ecosystem {
    /// All ecosystems, in display order.
    pub const ALL: [Self; 11] = [
        Self::Npm,
        Self::PyPi,
        Self::Cargo,
        Self::RubyGems,
        Self::Golang,
        Self::Composer,
        Self::Pub,
        Self::Swift,
        Self::Cpan,
        Self::Maven,
        Self::Cran,
    ];

    /// The Package URL `type` component for this ecosystem
    #[must_use]
    pub const fn purl_type(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::PyPi => "pypi",
            Self::Cargo => "cargo",
            Self::RubyGems => "gem",
            Self::Golang => "golang",
            Self::Composer => "composer",
            Self::Pub => "pub",
            Self::Swift => "swift",
            Self::Cpan => "cpan",
            Self::Maven => "maven",
            Self::Cran => "cran",
        }
    }

    /// Parse ecosystem from PURL type
    #[must_use]
    pub fn from_purl_type(purl_type: &str) -> Option<Self> {
        match purl_type.to_lowercase().as_str() {
            "npm" => Some(Self::Npm),
            "pypi" => Some(Self::PyPi),
            "cargo" => Some(Self::Cargo),
            "gem" => Some(Self::RubyGems),
            "golang" | "go" => Some(Self::Golang),
            "composer" => Some(Self::Composer),
            "pub" => Some(Self::Pub),
            "swift" => Some(Self::Swift),
            "cpan" => Some(Self::Cpan),
            "maven" => Some(Self::Maven),
            "cran" => Some(Self::Cran),
            _ => None,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.purl_type())
    }
}
