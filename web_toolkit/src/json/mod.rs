//! Strict JSON request decoding and envelope-based response encoding.

pub mod codec;
pub mod response;

pub use codec::{decode_json, read_json};
pub use response::{error_json, write_json, JsonResponse};
