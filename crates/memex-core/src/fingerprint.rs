//! Error fingerprinting (spec §4.4.2): collapse superficially different error
//! messages ("file foo.ts:42: X undefined" vs "file foo.ts:57: X undefined")
//! into the same fingerprint so the observer's frequency filter can count
//! repeat occurrences of the same underlying failure.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static ABS_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:/[\w.\-]+)+\.\w+").unwrap());
static REL_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[\w.\-]+/)+[\w.\-]+\.\w+\b").unwrap());
static LINE_COL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\d+(?::\d+)?\b").unwrap());
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b").unwrap()
});
static ISO_TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?").unwrap()
});

/// Normalize an error message: collapse paths to `<path>`, strip line/column
/// suffixes, strip UUIDs and ISO timestamps, lowercase, and trim.
pub fn normalize(message: &str) -> String {
    let mut out = ABS_PATH_RE.replace_all(message, "<path>").into_owned();
    out = REL_PATH_RE.replace_all(&out, "<path>").into_owned();
    out = LINE_COL_RE.replace_all(&out, "").into_owned();
    out = UUID_RE.replace_all(&out, "<uuid>").into_owned();
    out = ISO_TIMESTAMP_RE.replace_all(&out, "<timestamp>").into_owned();
    out.to_lowercase().trim().to_string()
}

/// `sha256(normalize(message))[..16]` hex chars, per spec.
pub fn fingerprint(message: &str) -> String {
    let normalized = normalize(message);
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_error_at_different_lines_fingerprints_identically() {
        let a = "file /home/dev/proj/src/foo.ts:42: Cannot find name 'bar'";
        let b = "file /home/dev/proj/src/foo.ts:57: Cannot find name 'bar'";
        assert_eq!(fingerprint(a), fingerprint(b));
    }

    #[test]
    fn relative_path_and_absolute_path_both_normalize() {
        let a = "error in src/lib/foo.ts: undefined";
        let b = "error in /abs/src/lib/foo.ts: undefined";
        assert_eq!(normalize(a), normalize(b));
    }

    #[test]
    fn different_errors_fingerprint_differently() {
        let a = "Cannot find name 'bar'";
        let b = "Cannot find name 'baz'";
        assert_ne!(fingerprint(a), fingerprint(b));
    }

    #[test]
    fn uuid_and_timestamp_are_stripped() {
        let a = "request 123e4567-e89b-12d3-a456-426614174000 failed at 2026-07-30T10:00:00Z";
        let b = "request 999e4567-e89b-12d3-a456-426614174999 failed at 2026-01-01T00:00:00Z";
        assert_eq!(normalize(a), normalize(b));
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let f = fingerprint("anything");
        assert_eq!(f.len(), 16);
        assert!(f.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
