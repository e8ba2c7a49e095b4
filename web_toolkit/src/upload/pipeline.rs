//! Multipart ingestion: size ceiling, content sniffing, allow-list
//! enforcement, and streaming persistence.

use std::path::Path;

use axum::extract::Request;
use axum::http::header;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::UploadConfig;
use crate::error::{Result, ToolkitError};
use crate::upload::models::UploadedFile;
use crate::upload::naming::{generate_file_name, sanitize_file_name};
use crate::upload::sniff::{sniff_content_type, SNIFF_LEN};

/// Processes every file part of a `multipart/form-data` request, returning
/// one descriptor per persisted file in encounter order. Parts without a
/// filename (plain form values) are skipped.
///
/// Each part has its leading bytes sniffed for its true content type
/// before anything touches the disk; the client-declared part header is
/// ignored. With `rename` set, files are written under a random
/// alphanumeric name that keeps the original extension.
///
/// The batch is fail-fast without rollback: the first part that fails
/// validation or I/O aborts the whole call, and later parts are never
/// written, but files persisted for earlier parts stay on disk. Callers
/// needing all-or-nothing disk state must stage and rename themselves.
///
/// `destination_dir` must already exist.
pub async fn process_upload(
    request: Request,
    destination_dir: &Path,
    rename: bool,
    config: &UploadConfig,
) -> Result<Vec<UploadedFile>> {
    let limit = config.upload_limit();

    // Reject declared-oversize bodies before parsing anything. Chunked
    // bodies carry no length up front and are caught by the running count
    // below.
    if let Some(declared) = declared_body_length(&request) {
        if declared > limit {
            return Err(ToolkitError::BodyTooLarge { limit });
        }
    }

    let boundary = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| multer::parse_boundary(v).ok())
        .ok_or_else(|| {
            ToolkitError::MalformedUpload("request has no multipart boundary".to_string())
        })?;

    let mut multipart = multer::Multipart::new(request.into_body().into_data_stream(), boundary);

    let mut uploaded = Vec::new();
    let mut body_bytes: u64 = 0;

    while let Some(mut field) = multipart.next_field().await.map_err(malformed)? {
        let Some(file_name) = field.file_name() else {
            continue;
        };
        let original_name = sanitize_file_name(file_name);
        if original_name.is_empty() {
            return Err(ToolkitError::InvalidInput(format!(
                "unusable file name in part {:?}",
                field.name().unwrap_or_default()
            )));
        }

        // Buffer enough of the part to identify it. The buffered head is
        // written to disk first and the rest of the part streamed after
        // it, so the stream is never rewound and memory stays bounded.
        let mut head: Vec<u8> = Vec::with_capacity(SNIFF_LEN);
        while head.len() < SNIFF_LEN {
            match field.chunk().await.map_err(malformed)? {
                Some(chunk) => {
                    body_bytes += chunk.len() as u64;
                    if body_bytes > limit {
                        return Err(ToolkitError::BodyTooLarge { limit });
                    }
                    head.extend_from_slice(&chunk);
                }
                None => break,
            }
        }

        let content_type = sniff_content_type(&head[..head.len().min(SNIFF_LEN)]);
        if !config.is_allowed_type(&content_type) {
            tracing::warn!(
                content_type = %content_type,
                file = %original_name,
                "rejecting upload: sniffed type not in allow-list"
            );
            return Err(ToolkitError::DisallowedFileType { content_type });
        }

        let new_name = if rename {
            generate_file_name(&original_name)
        } else {
            original_name.clone()
        };

        let destination = destination_dir.join(&new_name);
        let mut file = File::create(&destination).await?;
        file.write_all(&head).await?;
        let mut size_bytes = head.len() as u64;

        while let Some(chunk) = field.chunk().await.map_err(malformed)? {
            body_bytes += chunk.len() as u64;
            if body_bytes > limit {
                return Err(ToolkitError::BodyTooLarge { limit });
            }
            file.write_all(&chunk).await?;
            size_bytes += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(file = %new_name, size = size_bytes, "upload part persisted");

        uploaded.push(UploadedFile {
            original_name,
            new_name,
            size_bytes,
        });
    }

    Ok(uploaded)
}

/// Convenience wrapper for endpoints that accept exactly one file.
pub async fn process_single_upload(
    request: Request,
    destination_dir: &Path,
    rename: bool,
    config: &UploadConfig,
) -> Result<UploadedFile> {
    let mut files = process_upload(request, destination_dir, rename, config).await?;
    match files.len() {
        1 => Ok(files.remove(0)),
        0 => Err(ToolkitError::MalformedUpload(
            "request carries no file part".to_string(),
        )),
        n => Err(ToolkitError::MalformedUpload(format!(
            "expected one file part, found {n}"
        ))),
    }
}

fn malformed(err: multer::Error) -> ToolkitError {
    ToolkitError::MalformedUpload(err.to_string())
}

fn declared_body_length(request: &Request) -> Option<u64> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
