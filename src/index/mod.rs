//! Product to vendor lookup.
//!
//! The vulnerability database that normally backs this lookup lives outside
//! the crate; [`IdentityIndex`] is the seam it plugs into. [`StaticIndex`]
//! is an in-memory implementation loaded from a JSON or YAML mapping file.

mod static_index;

pub use static_index::StaticIndex;

use indexmap::IndexSet;
use std::sync::Arc;

/// Read-only store mapping a normalized product name to its vendors.
///
/// Implementations must be safe to share between scanner threads and must
/// return vendors in a stable order so resolution stays deterministic.
pub trait IdentityIndex: Send + Sync {
    /// All vendors known for `product`, or an empty set.
    fn lookup_vendors(&self, product: &str) -> IndexSet<String>;
}

impl<T: IdentityIndex + ?Sized> IdentityIndex for Arc<T> {
    fn lookup_vendors(&self, product: &str) -> IndexSet<String> {
        (**self).lookup_vendors(product)
    }
}

impl<T: IdentityIndex + ?Sized> IdentityIndex for &T {
    fn lookup_vendors(&self, product: &str) -> IndexSet<String> {
        (**self).lookup_vendors(product)
    }
}
