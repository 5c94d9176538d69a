//! Data models for call templates and responses.

pub mod call;
pub mod response;

pub use call::{CallSet, CallTemplate, ExtractRule, ExtractSource, HttpMethod, MultipartFilePart};
pub use response::CallResponse;
