//! Identifier codecs: CPE 2.2, CPE 2.3 and Package URL.
//!
//! All functions here are pure and stateless; grammar checks run before any
//! field is extracted, so a malformed identifier never yields partial data.

pub mod cpe;
pub mod purl;

pub use cpe::{decode_cpe22, decode_cpe23, is_valid_cpe22, is_valid_cpe23, CpeIdentity};
pub use purl::PurlIdentity;
