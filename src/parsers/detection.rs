//! Filename-based manifest detection.
//!
//! The set of manifest formats is closed: each one is recognized by its
//! exact file name through a static table.

use crate::model::Ecosystem;
use std::fmt;
use std::path::Path;

/// Manifest format identified during detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    NpmLock,
    PipRequirements,
    PythonMetadata,
    CargoLock,
    GemfileLock,
    GoMod,
    ComposerLock,
    PubspecLock,
    SwiftResolved,
    Cpanfile,
    MavenPom,
    RenvLock,
}

/// File name to format table, consulted in order.
pub const MANIFEST_FILES: &[(&str, ManifestKind)] = &[
    ("package-lock.json", ManifestKind::NpmLock),
    (".package-lock.json", ManifestKind::NpmLock),
    ("requirements.txt", ManifestKind::PipRequirements),
    ("PKG-INFO", ManifestKind::PythonMetadata),
    ("METADATA", ManifestKind::PythonMetadata),
    ("Cargo.lock", ManifestKind::CargoLock),
    ("Gemfile.lock", ManifestKind::GemfileLock),
    ("go.mod", ManifestKind::GoMod),
    ("composer.lock", ManifestKind::ComposerLock),
    ("pubspec.lock", ManifestKind::PubspecLock),
    ("Package.resolved", ManifestKind::SwiftResolved),
    ("cpanfile", ManifestKind::Cpanfile),
    ("pom.xml", ManifestKind::MavenPom),
    ("renv.lock", ManifestKind::RenvLock),
];

impl ManifestKind {
    /// Identify the manifest format from a file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        Self::from_file_name(file_name)
    }

    /// Identify the manifest format from a bare file name.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        MANIFEST_FILES
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, kind)| *kind)
    }

    /// Get the human-readable name for this format.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NpmLock => "npm package-lock.json",
            Self::PipRequirements => "pip requirements.txt",
            Self::PythonMetadata => "Python PKG-INFO/METADATA",
            Self::CargoLock => "Cargo.lock",
            Self::GemfileLock => "Gemfile.lock",
            Self::GoMod => "go.mod",
            Self::ComposerLock => "composer.lock",
            Self::PubspecLock => "pubspec.lock",
            Self::SwiftResolved => "Swift Package.resolved",
            Self::Cpanfile => "cpanfile",
            Self::MavenPom => "Maven pom.xml",
            Self::RenvLock => "renv.lock",
        }
    }

    /// The ecosystem this manifest belongs to
    #[must_use]
    pub const fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::NpmLock => Ecosystem::Npm,
            Self::PipRequirements | Self::PythonMetadata => Ecosystem::PyPi,
            Self::CargoLock => Ecosystem::Cargo,
            Self::GemfileLock => Ecosystem::RubyGems,
            Self::GoMod => Ecosystem::Golang,
            Self::ComposerLock => Ecosystem::Composer,
            Self::PubspecLock => Ecosystem::Pub,
            Self::SwiftResolved => Ecosystem::Swift,
            Self::Cpanfile => Ecosystem::Cpan,
            Self::MavenPom => Ecosystem::Maven,
            Self::RenvLock => Ecosystem::Cran,
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_file_name() {
        assert_eq!(
            ManifestKind::from_path(Path::new("web/package-lock.json")),
            Some(ManifestKind::NpmLock)
        );
        assert_eq!(
            ManifestKind::from_path(Path::new("node_modules/.package-lock.json")),
            Some(ManifestKind::NpmLock)
        );
        assert_eq!(
            ManifestKind::from_path(Path::new("site-packages/zstd-0.18.0.dist-info/METADATA")),
            Some(ManifestKind::PythonMetadata)
        );
        assert_eq!(
            ManifestKind::from_path(Path::new("Package.resolved")),
            Some(ManifestKind::SwiftResolved)
        );
    }

    #[test]
    fn test_unknown_files_are_ignored() {
        assert_eq!(ManifestKind::from_path(Path::new("Cargo.toml")), None);
        assert_eq!(ManifestKind::from_path(Path::new("package.json")), None);
        assert_eq!(ManifestKind::from_path(Path::new("/")), None);
    }

    #[test]
    fn test_every_kind_is_reachable() {
        for (name, kind) in MANIFEST_FILES {
            assert_eq!(ManifestKind::from_file_name(name), Some(*kind));
        }
    }
}
