//! Disk collaborators: directory bootstrap and static-file download
//! responses.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use tokio::fs;

use crate::error::{Result, ToolkitError};
use crate::upload::naming::sanitize_file_name;

/// Creates `path` (and any missing parents) when absent. Succeeds when the
/// directory already exists.
pub async fn create_dir_if_not_exist(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// Serves `directory/file_name` as an attachment presented to the client
/// as `display_name`.
///
/// `file_name` is sanitized to its base name first, so a traversal
/// sequence cannot escape `directory`. The content type is guessed from
/// the file path.
pub async fn download_static_file(
    directory: &Path,
    file_name: &str,
    display_name: &str,
) -> Result<Response> {
    let base_name = sanitize_file_name(file_name);
    if base_name.is_empty() {
        return Err(ToolkitError::InvalidInput(format!(
            "unusable file name {file_name:?}"
        )));
    }

    let path = directory.join(&base_name);
    let data = fs::read(&path).await?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    let disposition = format!(
        "attachment; filename=\"{}\"",
        display_name.replace('"', "\\\"")
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, data.len())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(data))
        .map_err(|e| ToolkitError::InvalidInput(format!("invalid download response: {e}")))
}
