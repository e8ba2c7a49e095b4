//! Shared configuration for the upload pipeline and the JSON codec.

use std::collections::HashSet;

/// Multipart body ceiling applied when the config leaves the limit unset (1 GiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// JSON body ceiling applied when the config leaves the limit unset (1 MiB).
pub const DEFAULT_MAX_JSON_SIZE: usize = 1024 * 1024;

/// Policy knobs consumed by [`crate::process_upload`] and [`crate::read_json`].
///
/// A zero value for either size field means "use the built-in default", so a
/// plain `UploadConfig::default()` behaves sensibly. The config carries no
/// behavior of its own and is cheap to clone; callers pass it by reference
/// into each operation.
#[derive(Debug, Clone, Default)]
pub struct UploadConfig {
    /// Byte ceiling for a whole multipart body. `0` means [`DEFAULT_MAX_UPLOAD_SIZE`].
    pub max_upload_size: u64,
    /// Sniffed content types accepted by the upload pipeline. Empty means any.
    pub allowed_mime_types: HashSet<String>,
    /// Byte ceiling for a JSON body. `0` means [`DEFAULT_MAX_JSON_SIZE`].
    pub max_json_size: usize,
    /// When false (the default) unknown JSON object keys are rejected.
    pub allow_unknown_json_fields: bool,
}

impl UploadConfig {
    pub fn upload_limit(&self) -> u64 {
        if self.max_upload_size == 0 {
            DEFAULT_MAX_UPLOAD_SIZE
        } else {
            self.max_upload_size
        }
    }

    pub fn json_limit(&self) -> usize {
        if self.max_json_size == 0 {
            DEFAULT_MAX_JSON_SIZE
        } else {
            self.max_json_size
        }
    }

    pub fn is_allowed_type(&self, content_type: &str) -> bool {
        self.allowed_mime_types.is_empty() || self.allowed_mime_types.contains(content_type)
    }
}
