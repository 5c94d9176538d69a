//! Top-level error type returned by command handlers.

use crate::executor::NetworkError;
use crate::payload::PayloadError;
use crate::store::StoreError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CourierError {
    /// Bad usage or a workspace/vars/call reference that doesn't resolve.
    Configuration(String),

    /// Payload construction failed before anything went on the wire.
    Payload(PayloadError),

    /// The exchange with the remote endpoint failed.
    Network(NetworkError),

    /// Reading or writing the store failed.
    Store(StoreError),

    /// Filesystem failure outside the store, e.g. the output directory.
    Io(io::Error),
}

impl CourierError {
    pub fn config(message: impl Into<String>) -> Self {
        CourierError::Configuration(message.into())
    }
}

impl fmt::Display for CourierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourierError::Configuration(message) => write!(f, "{}", message),
            CourierError::Payload(err) => write!(f, "{}", err),
            CourierError::Network(err) => write!(f, "{}", err),
            CourierError::Store(err) => write!(f, "{}", err),
            CourierError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CourierError {}

impl From<PayloadError> for CourierError {
    fn from(err: PayloadError) -> Self {
        CourierError::Payload(err)
    }
}

impl From<NetworkError> for CourierError {
    fn from(err: NetworkError) -> Self {
        CourierError::Network(err)
    }
}

impl From<StoreError> for CourierError {
    fn from(err: StoreError) -> Self {
        CourierError::Store(err)
    }
}

impl From<io::Error> for CourierError {
    fn from(err: io::Error) -> Self {
        CourierError::Io(err)
    }
}
