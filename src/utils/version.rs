//! Version comparison utilities.

use std::cmp::Ordering;

/// Compare two dotted version strings numerically.
///
/// Each dot-separated segment is compared by its leading digits; missing
/// segments count as zero, so `22.2` equals `22.2.0`. When neither string
/// starts with a digit the comparison falls back to plain string order.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (Some(left), Some(right)) = (numeric_segments(a), numeric_segments(b)) else {
        return a.cmp(b);
    };

    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Leading numeric value of each segment, or `None` if the version does not
/// start with a digit.
fn numeric_segments(version: &str) -> Option<Vec<u64>> {
    let version = version.trim().trim_start_matches(['v', 'V']);
    if !version.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(
        version
            .split('.')
            .map(|segment| {
                let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("1.0.1", "1.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_versions_is_numeric() {
        assert_eq!(compare_versions("20.0.2", "22.2"), Ordering::Less);
        assert_eq!(compare_versions("23.0", "22.2"), Ordering::Greater);
        assert_eq!(compare_versions("22.10", "22.2"), Ordering::Greater);
        assert_eq!(compare_versions("22.2", "22.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("v24.0b1", "22.2"), Ordering::Greater);
    }

    #[test]
    fn test_non_numeric_falls_back_to_string_order() {
        assert_eq!(compare_versions("alpha", "beta"), Ordering::Less);
    }
}
