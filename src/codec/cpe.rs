//! CPE 2.2 (URI binding) and CPE 2.3 (formatted string) decoding.

use crate::error::{IdentifierErrorKind, InventoryError, Result};
use regex::Regex;
use std::sync::LazyLock;

static CPE23_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r##"^cpe:2\.3:[aho\*\-](:(((\?*|\*?)([a-zA-Z0-9\-\._]|(\\[\\\*\?!"#$%\&'\(\)\+,\-\./:;<=>@\[\]\^`\{\|\}\~]))+(\?*|\*?))|[\*\-])){5}(:(([a-zA-Z]{2,3}(-([a-zA-Z]{2}|[0-9]{3}))?)|[\*\-]))(:(((\?*|\*?)([a-zA-Z0-9\-\._]|(\\[\\\*\?!"#$%\&'\(\)\+,\-\./:;<=>@\[\]\^`\{\|\}\~]))+(\?*|\*?))|[\*\-])){4}"##,
    )
    .expect("static regex")
});

static CPE22_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[c][pP][eE]:/[AHOaho]?(:[A-Za-z0-9\._\-~%]*){0,6}").expect("static regex")
});

/// Vendor/product/version slots of a decoded CPE.
///
/// Empty slots, and the CPE 2.3 logical values `*` (ANY) and `-` (NA), are
/// reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpeIdentity {
    pub vendor: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
}

/// Check `cpe` against the CPE 2.3 formatted-string grammar.
#[must_use]
pub fn is_valid_cpe23(cpe: &str) -> bool {
    CPE23_PATTERN.is_match(cpe)
}

/// Check `cpe` against the CPE 2.2 URI grammar.
#[must_use]
pub fn is_valid_cpe22(cpe: &str) -> bool {
    CPE22_PATTERN.is_match(cpe)
}

/// Decode a CPE 2.3 formatted string such as
/// `cpe:2.3:a:nasm:netwide_assembler:2.15:*:*:*:*:*:*:*`.
pub fn decode_cpe23(cpe: &str) -> Result<CpeIdentity> {
    if !is_valid_cpe23(cpe) {
        return Err(InventoryError::identifier(
            "decoding CPE 2.3",
            IdentifierErrorKind::InvalidCpe23(cpe.to_string()),
        ));
    }

    let fields = split_unescaped(cpe);
    Ok(CpeIdentity {
        vendor: slot(&fields, 3),
        product: slot(&fields, 4),
        version: slot(&fields, 5),
    })
}

/// Decode a CPE 2.2 URI such as `cpe:/a:zlib:zlib:1.2.13`.
///
/// Percent escapes are kept verbatim.
pub fn decode_cpe22(cpe: &str) -> Result<CpeIdentity> {
    if !is_valid_cpe22(cpe) {
        return Err(InventoryError::identifier(
            "decoding CPE 2.2",
            IdentifierErrorKind::InvalidCpe22(cpe.to_string()),
        ));
    }

    let fields: Vec<&str> = cpe.split(':').collect();
    Ok(CpeIdentity {
        vendor: slot(&fields, 2),
        product: slot(&fields, 3),
        version: slot(&fields, 4),
    })
}

fn slot(fields: &[&str], index: usize) -> Option<String> {
    fields
        .get(index)
        .map(|field| field.trim())
        .filter(|field| !field.is_empty() && *field != "*" && *field != "-")
        .map(str::to_string)
}

/// Split a CPE 2.3 string on colons that are not backslash-escaped.
fn split_unescaped(cpe: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in cpe.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            ':' if !escaped => {
                fields.push(&cpe[start..idx]);
                start = idx + 1;
            }
            _ => escaped = false,
        }
    }
    fields.push(&cpe[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cpe23_nasm() {
        let id = decode_cpe23("cpe:2.3:a:nasm:netwide_assembler:2.15:*:*:*:*:*:*:*").unwrap();
        assert_eq!(id.vendor.as_deref(), Some("nasm"));
        assert_eq!(id.product.as_deref(), Some("netwide_assembler"));
        assert_eq!(id.version.as_deref(), Some("2.15"));
    }

    #[test]
    fn test_decode_cpe23_any_version_is_absent() {
        let id = decode_cpe23("cpe:2.3:a:zlib:zlib:*:*:*:*:*:*:*:*").unwrap();
        assert_eq!(id.version, None);
        assert_eq!(id.product.as_deref(), Some("zlib"));
    }

    #[test]
    fn test_decode_cpe23_escaped_colon_stays_in_field() {
        let id = decode_cpe23(r"cpe:2.3:a:acme:foo\:bar:1.0:*:*:*:*:*:*:*").unwrap();
        assert_eq!(id.product.as_deref(), Some(r"foo\:bar"));
        assert_eq!(id.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_decode_cpe22() {
        let id = decode_cpe22("cpe:/a:zlib:zlib:1.2.13").unwrap();
        assert_eq!(id.vendor.as_deref(), Some("zlib"));
        assert_eq!(id.product.as_deref(), Some("zlib"));
        assert_eq!(id.version.as_deref(), Some("1.2.13"));
    }

    #[test]
    fn test_decode_cpe22_missing_version() {
        let id = decode_cpe22("cpe:/a:gnu:glibc").unwrap();
        assert_eq!(id.product.as_deref(), Some("glibc"));
        assert_eq!(id.version, None);

        let id = decode_cpe22("cpe:/a:gnu:glibc:").unwrap();
        assert_eq!(id.version, None);
    }

    #[test]
    fn test_both_flavours_agree() {
        let v23 = decode_cpe23("cpe:2.3:a:openssl:openssl:3.0.7:*:*:*:*:*:*:*").unwrap();
        let v22 = decode_cpe22("cpe:/a:openssl:openssl:3.0.7").unwrap();
        assert_eq!(v23, v22);
    }

    #[test]
    fn test_malformed_inputs_are_rejected() {
        assert!(decode_cpe23("cpe:2.3:a:only:three").is_err());
        assert!(decode_cpe23("not a cpe").is_err());
        assert!(decode_cpe22("cpe:2.3:a:x:y:1:*:*:*:*:*:*:*").is_err());
        assert!(decode_cpe22("pkg:npm/foo@1").is_err());
    }
}
