//! Strict JSON body decoding.
//!
//! Ordinary decoders accept oversized bodies, trailing garbage, and
//! silently dropped unknown keys; every one of those is an explicit
//! policy here.

use axum::extract::Request;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;

use crate::config::UploadConfig;
use crate::error::{Result, ToolkitError};

/// Decodes a size-bounded request body holding exactly one JSON document.
///
/// The body may not exceed `config.json_limit()` bytes, must parse as a
/// single JSON value, and under the default policy may not contain object
/// keys absent from `T`. The target must not be trusted when an error
/// comes back; the decode may have stopped partway through.
pub async fn read_json<T: DeserializeOwned>(request: Request, config: &UploadConfig) -> Result<T> {
    let body = read_body_bounded(request, config.json_limit()).await?;
    decode_json(&body, config.allow_unknown_json_fields)
}

/// Decodes one JSON document from a byte slice under the unknown-field
/// policy, rejecting any trailing value.
pub fn decode_json<T: DeserializeOwned>(body: &[u8], allow_unknown_fields: bool) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ToolkitError::InvalidJson(
            "body must not be empty".to_string(),
        ));
    }

    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let mut unknown_field: Option<String> = None;
    let value = serde_ignored::deserialize(&mut deserializer, |path| {
        if unknown_field.is_none() {
            unknown_field = Some(path.to_string());
        }
    })
    .map_err(|e| ToolkitError::InvalidJson(e.to_string()))?;

    if !allow_unknown_fields {
        if let Some(field) = unknown_field {
            return Err(ToolkitError::UnknownField(field));
        }
    }

    deserializer.end().map_err(|_| ToolkitError::TrailingData)?;

    Ok(value)
}

// Drains the body stream into memory, aborting as soon as the running
// total crosses the ceiling so a hostile body cannot buffer unbounded.
async fn read_body_bounded(request: Request, limit: usize) -> Result<Vec<u8>> {
    let mut stream = request.into_body().into_data_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| ToolkitError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        if body.len() + chunk.len() > limit {
            return Err(ToolkitError::BodyTooLarge {
                limit: limit as u64,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
