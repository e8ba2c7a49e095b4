//! Content-type detection from leading bytes.
//!
//! The client-declared part header is never consulted; the allow-list
//! check runs against what the bytes actually are.

/// Number of leading bytes buffered for detection.
pub const SNIFF_LEN: usize = 512;

/// Determines the content type of `prefix` from its magic bytes.
///
/// Falls back to `text/plain` for data that decodes as UTF-8 without NUL
/// bytes, and to `application/octet-stream` for everything else.
pub fn sniff_content_type(prefix: &[u8]) -> String {
    if let Some(kind) = infer::get(prefix) {
        return kind.mime_type().to_string();
    }
    if looks_like_text(prefix) {
        return "text/plain".to_string();
    }
    "application/octet-stream".to_string()
}

// The prefix may cut a multi-byte sequence short, so an incomplete
// sequence within the last three bytes still counts as text.
fn looks_like_text(prefix: &[u8]) -> bool {
    if prefix.is_empty() || prefix.contains(&0) {
        return false;
    }
    match std::str::from_utf8(prefix) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none() && prefix.len() - err.valid_up_to() <= 3,
    }
}
