//! CVE identifier detection
//!
//! A CVE identifier is `CVE-` followed by a 4-digit year and a 4-7 digit
//! sequence number, e.g. `CVE-2024-31497`. Matching is case-insensitive and
//! anchored at the start of the string only: trailing characters after the
//! sequence number do not prevent a match, but text preceding the prefix does.

use regex::Regex;
use std::sync::OnceLock;

fn cve_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^CVE-\d{4}-\d{4,7}").unwrap())
}

/// Check whether a string begins with a CVE identifier.
///
/// Callers that record a match keep the full original string, casing
/// included - the detector only decides whether the string qualifies.
pub fn is_cve_like(text: &str) -> bool {
    cve_pattern().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ids_match() {
        assert!(is_cve_like("CVE-2024-31497"));
        assert!(is_cve_like("CVE-2021-44228"));
        assert!(is_cve_like("CVE-1999-0001"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_cve_like("cve-2024-31497"));
        assert!(is_cve_like("Cve-2021-44228"));
    }

    #[test]
    fn test_trailing_text_still_matches() {
        // Anchored at the start only
        assert!(is_cve_like("CVE-2021-44228 (Log4Shell)"));
        assert!(is_cve_like("CVE-2024-31497,CVE-2024-31498"));
    }

    #[test]
    fn test_leading_text_does_not_match() {
        assert!(!is_cve_like("see CVE-2021-1234 for details"));
        assert!(!is_cve_like(" CVE-2021-1234"));
    }

    #[test]
    fn test_sequence_number_bounds() {
        assert!(is_cve_like("CVE-2024-1234"));
        assert!(is_cve_like("CVE-2024-1234567"));

        assert!(!is_cve_like("CVE-2024-123"));
        assert!(!is_cve_like("CVE-24-1234"));
        assert!(!is_cve_like("CVE-2024"));
        assert!(!is_cve_like("CWE-502"));
        assert!(!is_cve_like(""));
    }
}
