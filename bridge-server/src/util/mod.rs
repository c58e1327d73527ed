//! Utility modules.

pub mod headers;

pub use headers::{forward_headers, is_json_content_type, mime_type, strip_hop_headers};
