use serde::{Deserialize, Serialize};

/// Descriptor for one file persisted by the upload pipeline.
///
/// Returned to the caller, which owns the file on disk from then on; the
/// pipeline keeps no record of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Filename as declared by the client, after sanitization.
    pub original_name: String,
    /// Name the file was written under in the destination directory.
    pub new_name: String,
    /// Number of bytes written to disk.
    pub size_bytes: u64,
}
