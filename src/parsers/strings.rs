//! Printable-string extraction, in the manner of `strings(1)`.
//!
//! Package metadata can sit inside a binary (a frozen executable, a wheel
//! cache, a firmware image), so text is recovered from raw bytes before any
//! line-based parsing.

/// Shortest run of printable bytes kept as a string.
pub const MIN_STRING_LENGTH: usize = 4;

/// Extract runs of printable ASCII of at least `min_len` bytes, one per line.
///
/// Tabs count as printable; any other control byte or non-ASCII byte ends a
/// run, so plain text files come back line for line.
#[must_use]
pub fn printable_strings(data: &[u8], min_len: usize) -> String {
    let mut out = String::new();
    let mut run = String::new();

    let flush = |run: &mut String, out: &mut String| {
        if run.len() >= min_len {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(run);
        }
        run.clear();
    };

    for &byte in data {
        if byte == b'\t' || (0x20..0x7f).contains(&byte) {
            run.push(char::from(byte));
        } else {
            flush(&mut run, &mut out);
        }
    }
    flush(&mut run, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through_by_line() {
        let text = b"Metadata-Version: 2.1\nName: zstandard\nVersion: 0.18.0\n";
        assert_eq!(
            printable_strings(text, MIN_STRING_LENGTH),
            "Metadata-Version: 2.1\nName: zstandard\nVersion: 0.18.0"
        );
    }

    #[test]
    fn test_binary_noise_is_dropped() {
        let data = b"\x00\x01ab\x00\x7fName: demo\x00\xff\xfeVersion: 1.0\x00";
        assert_eq!(
            printable_strings(data, MIN_STRING_LENGTH),
            "Name: demo\nVersion: 1.0"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(printable_strings(b"", MIN_STRING_LENGTH), "");
    }
}
