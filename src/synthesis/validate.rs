//! Structural self-validation for synthesized documents.
//!
//! Every tier's output candidate must pass this predicate before the
//! pipeline accepts it; a rejected candidate causes fallthrough to the
//! next tier. The check is structural only: signature plus catalog-root
//! or cross-reference markers, not a full parse.

/// Minimum plausible size for a PDF with one page and a trailer.
const MIN_DOCUMENT_LEN: usize = 100;

/// Window searched at each end of the file for structural markers.
const MARKER_WINDOW: usize = 1024;

/// PDF file signature.
const SIGNATURE: &[u8] = b"%PDF-";

/// Whether `bytes` is structurally a valid PDF document.
///
/// Requires: length of at least 100 bytes, the `%PDF-` signature within
/// the first 10 bytes, and a catalog-root (`/Root`) or cross-reference
/// end (`startxref`) marker within the first or last KiB.
pub fn is_valid_document(bytes: &[u8]) -> bool {
    if bytes.len() < MIN_DOCUMENT_LEN {
        return false;
    }

    let head10 = &bytes[..10.min(bytes.len())];
    if find(head10, SIGNATURE).is_none() {
        return false;
    }

    let head = &bytes[..MARKER_WINDOW.min(bytes.len())];
    let tail = &bytes[bytes.len().saturating_sub(MARKER_WINDOW)..];

    find(head, b"/Root").is_some()
        || find(head, b"startxref").is_some()
        || find(tail, b"/Root").is_some()
        || find(tail, b"startxref").is_some()
}

/// First offset of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Last offset of `needle` in `haystack`.
pub(crate) fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plausible_pdf() -> Vec<u8> {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend(vec![b'x'; 200]);
        bytes.extend(b"trailer << /Size 4 /Root 1 0 R >>\nstartxref\n9\n%%EOF");
        bytes
    }

    #[test]
    fn test_accepts_plausible_pdf() {
        assert!(is_valid_document(&plausible_pdf()));
    }

    #[test]
    fn test_rejects_truncated() {
        let bytes = &plausible_pdf()[..50];
        assert!(!is_valid_document(bytes));
    }

    #[test]
    fn test_rejects_wrong_signature() {
        let mut bytes = plausible_pdf();
        bytes[..5].copy_from_slice(b"PK\x03\x04\x00");
        assert!(!is_valid_document(&bytes));
    }

    #[test]
    fn test_rejects_missing_markers() {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend(vec![b'x'; 4096]);
        assert!(!is_valid_document(&bytes));
    }

    #[test]
    fn test_signature_may_follow_junk_byte() {
        // Signature must appear within the first 10 bytes, not
        // necessarily at offset zero.
        let mut bytes = b"\xef\xbb\xbf%PDF-1.4\n".to_vec();
        bytes.extend(vec![b'x'; 200]);
        bytes.extend(b"startxref\n0\n%%EOF");
        assert!(is_valid_document(&bytes));
    }

    #[test]
    fn test_find_helpers() {
        assert_eq!(find(b"abcabc", b"bc"), Some(1));
        assert_eq!(rfind(b"abcabc", b"bc"), Some(4));
        assert_eq!(find(b"abc", b"xyz"), None);
        assert_eq!(find(b"ab", b"abc"), None);
    }
}
