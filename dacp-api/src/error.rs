use http_client::HttpError;
use thiserror::Error;

use crate::dmap::{DecodeError, TypeMismatch};

/// High-level API errors for DACP operations
///
/// Transport, decoding and session failures are kept apart so callers can
/// pick their own retry policy: nothing here is retried implicitly except
/// the login handshake.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection failed, timed out, or the server answered non-2xx
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// The response body is not a well-formed TLV stream
    ///
    /// Covers frames overrunning their scope, truncated streams and
    /// malformed tags. The whole decode is abandoned.
    #[error("Protocol error: {0}")]
    Protocol(#[from] DecodeError),

    /// A decoded field is missing or of an unexpected kind
    #[error("Type mismatch: {0}")]
    TypeMismatch(#[from] TypeMismatch),

    /// An operation that needs a session was attempted before `login`
    #[error("Not authenticated: call login() first")]
    NotAuthenticated,

    /// The server refused a request made with our session id
    #[error("Session expired or rejected by server")]
    SessionExpired,

    /// The server kept refusing to start a session
    #[error("Login rejected after {attempts} attempts: {reason}")]
    LoginRejected { attempts: u32, reason: String },

    /// Invalid parameter value
    ///
    /// Volume out of range, empty speaker list, malformed host, etc.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A background fade panicked before finishing
    #[error("Fade task aborted: {0}")]
    FadeAborted(String),
}

impl ApiError {
    /// True for errors that mean the session must be (re)established
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            ApiError::NotAuthenticated | ApiError::SessionExpired | ApiError::LoginRejected { .. }
        )
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_protocol_error(&self) -> bool {
        matches!(self, ApiError::Protocol(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
