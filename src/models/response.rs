//! HTTP response model.
//!
//! Responses keep their headers as an ordered sequence of name/value pairs:
//! wire order and duplicates both matter to header extraction, which takes
//! the first match for a name.

use std::time::Duration;

/// A completed HTTP response.
#[derive(Debug, Clone)]
pub struct CallResponse {
    /// HTTP status code (e.g. 200, 404).
    pub status: u16,

    /// Canonical reason phrase for the status code, empty when unknown.
    pub status_text: String,

    /// Response headers in wire order, duplicates preserved.
    pub headers: Vec<(String, String)>,

    /// Response body as raw bytes, so binary responses survive untouched.
    pub body: Vec<u8>,

    /// Wall-clock time for the whole exchange, body download included.
    pub elapsed: Duration,
}

impl CallResponse {
    /// First header value whose name matches, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header_name, _)| header_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The declared `Content-Type` header value, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, lossily.
    pub fn body_as_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
