//! The file upload pipeline: multipart parsing, content sniffing,
//! allow-list enforcement, and streaming persistence.

pub mod models;
pub mod naming;
pub mod pipeline;
pub mod sniff;

pub use models::UploadedFile;
pub use naming::{generate_file_name, random_string, sanitize_file_name};
pub use pipeline::{process_single_upload, process_upload};
pub use sniff::sniff_content_type;
