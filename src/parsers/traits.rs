//! Parser trait definitions.
//!
//! This module defines the `ManifestParser` trait implemented by every
//! format-specific decoder.

use super::ManifestKind;
use crate::error::Result;
use crate::model::RawFragment;
use std::path::Path;
use tracing::warn;

/// Lazy, finite sequence of fragments decoded from one manifest.
///
/// The sequence is owned by a single consumer and cannot be restarted.
pub type Fragments = Box<dyn Iterator<Item = RawFragment> + Send>;

/// Trait for manifest format decoders
///
/// Implementors decode one file grammar into [`RawFragment`]s in file order.
/// A malformed entry is skipped; a file whose outer structure is invalid
/// makes [`fragments`](Self::fragments) return an error.
pub trait ManifestParser: Send + Sync {
    /// The manifest format handled by this parser
    fn kind(&self) -> ManifestKind;

    /// Decode the manifest at `path`.
    fn fragments(&self, path: &Path) -> Result<Fragments>;

    /// Decode the manifest at `path`, logging and swallowing file-level errors.
    ///
    /// A malformed file yields an empty sequence.
    fn parse_file(&self, path: &Path) -> Fragments {
        match self.fragments(path) {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(
                    "{} not scanned as {}: {}",
                    path.display(),
                    self.kind().name(),
                    e
                );
                Box::new(std::iter::empty())
            }
        }
    }
}
