//! JSON response envelope and writers.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Envelope shared by every JSON-emitting handler.
///
/// Failure envelopes never carry `data`; the constructors keep that
/// invariant by leaving no way to build one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,
}

impl JsonResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Serializes `payload` into a response with the given status code.
///
/// Caller-supplied headers are applied first; `Content-Type` is always
/// `application/json` regardless of what they contain.
pub fn write_json<T: Serialize>(
    status: StatusCode,
    payload: &T,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let body = serde_json::to_vec(payload)?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(extra) = headers {
        response.headers_mut().extend(extra);
    }
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(response)
}

/// Writes a failure envelope for `err`. Defaults to 400 when no status is
/// supplied.
pub fn error_json<E: std::fmt::Display>(err: &E, status: Option<StatusCode>) -> Result<Response> {
    let status = status.unwrap_or(StatusCode::BAD_REQUEST);
    write_json(status, &JsonResponse::error(err.to_string()), None)
}
