//! Errors surfaced while talking to the remote endpoint.
//!
//! Every variant is fatal for the current call. Nothing in the workspace
//! is touched once one of these comes back.

use std::fmt;

#[derive(Debug)]
pub enum NetworkError {
    /// The call URL failed to parse after substitution.
    InvalidUrl(String),

    /// The URL parsed but its scheme is neither http nor https.
    UnsupportedScheme(String),

    /// The request ran past the client timeout.
    Timeout,

    /// The TCP or TLS connection to the host failed.
    Connect(String),

    /// Any other transport failure, including protocol errors while
    /// draining the response body.
    Transport(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
            NetworkError::UnsupportedScheme(scheme) => {
                write!(f, "only http and https URLs are supported, got {}", scheme)
            }
            NetworkError::Timeout => write!(f, "request timed out"),
            NetworkError::Connect(msg) => write!(f, "connection failed: {}", msg),
            NetworkError::Transport(msg) => write!(f, "network error: {}", msg),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::Connect(err.to_string())
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        NetworkError::InvalidUrl(err.to_string())
    }
}
