//! Error types for the HTTP client

use thiserror::Error;

/// Errors that can occur while talking to a remote-control server
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection refused, DNS failure, timeout or other transport problem
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status code
    #[error("HTTP status {0}")]
    Status(u16),

    /// The response body could not be read to completion
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl HttpError {
    /// Status code carried by this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status(code) => Some(*code),
            _ => None,
        }
    }
}
