//! Helper routines for HTTP handlers: safe multipart file ingestion and a
//! strict JSON request/response codec, plus the small disk and string
//! utilities that commonly sit next to them.
//!
//! The upload pipeline validates each part's true content type by
//! sniffing its leading bytes, never the client-declared header, and
//! streams part contents to disk with bounded memory. The JSON codec
//! enforces body-size ceilings, a single-document rule, and a
//! configurable unknown-field policy. Both read their knobs from a shared
//! [`UploadConfig`] passed into each call; the crate holds no global
//! state, so concurrent invocations over distinct requests are safe.

pub mod config;
pub mod error;
pub mod fs;
pub mod json;
pub mod slug;
pub mod upload;

pub use config::UploadConfig;
pub use error::{Result, ToolkitError};
pub use fs::{create_dir_if_not_exist, download_static_file};
pub use json::{decode_json, error_json, read_json, write_json, JsonResponse};
pub use slug::slugify;
pub use upload::{process_single_upload, process_upload, random_string, UploadedFile};
