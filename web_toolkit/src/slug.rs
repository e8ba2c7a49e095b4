//! URL slug generation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, ToolkitError};

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z\d]+").unwrap();
}

/// Normalizes `input` into a lowercase hyphen-separated slug.
///
/// Runs of characters outside `[a-z0-9]` collapse into single hyphens and
/// leading/trailing hyphens are trimmed. Empty input, or input that
/// reduces to nothing (e.g. pure non-Latin script), is rejected.
pub fn slugify(input: &str) -> Result<String> {
    if input.is_empty() {
        return Err(ToolkitError::InvalidInput(
            "empty string is not permitted".to_string(),
        ));
    }

    let slug = NON_SLUG_CHARS
        .replace_all(&input.to_lowercase(), "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() {
        return Err(ToolkitError::InvalidInput(
            "slug is of zero length after removing unsupported characters".to_string(),
        ));
    }

    Ok(slug)
}
