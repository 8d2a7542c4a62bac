//! Private HTTP client for remote-control servers
//!
//! This crate provides a minimal blocking HTTP GET client specifically designed
//! for the DACP remote-control protocol: every command is a plain GET with
//! query parameters and every answer is a binary body that the caller decodes.

mod error;

pub use error::HttpError;

use std::io::Read;
use std::time::Duration;

/// Upper bound on a response body. Speaker lists are a few kilobytes at most.
pub const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// A minimal HTTP client for remote-control requests
///
/// Requests share one `ureq::Agent`, which may keep connections alive
/// between calls.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    /// Create a new client with default timeouts (5s connect, 10s read)
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(5), Duration::from_secs(10))
    }

    /// Create a client with explicit connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .build(),
        }
    }

    /// Send a GET request and return the full response body
    ///
    /// # Arguments
    /// * `url` - Absolute URL including the query string
    ///
    /// # Errors
    /// * `HttpError::Network` if the connection fails or times out
    /// * `HttpError::Status` if the server answers with a non-2xx status
    /// * `HttpError::Body` if the body cannot be read or exceeds [`MAX_BODY_BYTES`]
    pub fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        tracing::trace!("GET {}", url);

        let response = self
            .agent
            .get(url)
            .set("Viewer-Only-Client", "1")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => HttpError::Status(code),
                ureq::Error::Transport(t) => HttpError::Network(t.to_string()),
            })?;

        // ureq only treats 4xx/5xx as errors
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(HttpError::Status(status));
        }

        let body = read_limited(response.into_reader(), MAX_BODY_BYTES)?;

        tracing::trace!("received {} byte body from {}", body.len(), url);
        Ok(body)
    }
}

/// Read a whole body, failing rather than truncating past `limit` bytes
fn read_limited(reader: impl Read, limit: u64) -> Result<Vec<u8>, HttpError> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| HttpError::Body(e.to_string()))?;

    if body.len() as u64 > limit {
        return Err(HttpError::Body(format!(
            "response body exceeds {} bytes",
            limit
        )));
    }
    Ok(body)
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
