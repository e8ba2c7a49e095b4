//! Destination filenames: sanitization and collision-resistant renaming.

use std::ffi::OsStr;
use std::path::Path;

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Length of generated random file stems.
pub const RANDOM_NAME_LEN: usize = 25;

/// Returns a uniformly random alphanumeric string of exactly `length` characters.
pub fn random_string(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Reduces a client-supplied filename to a safe base name.
///
/// Takes the final path component only, keeps alphanumerics plus `.`, `-`
/// and `_`, and caps the result at 255 characters. Traversal sequences and
/// separators never survive. May return an empty string; callers treat
/// that as an invalid name.
pub fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("");

    base.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(255)
        .collect()
}

/// Random replacement name preserving the extension of `original`.
pub fn generate_file_name(original: &str) -> String {
    match Path::new(original).extension().and_then(OsStr::to_str) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", random_string(RANDOM_NAME_LEN), ext),
        _ => random_string(RANDOM_NAME_LEN),
    }
}
