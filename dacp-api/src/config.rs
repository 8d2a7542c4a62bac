//! Client configuration
//!
//! Everything the protocol client needs to reach a server and hold a session:
//! address, the caller-chosen session id, timeouts and the login retry policy.

use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::{ApiError, Result};

/// Default DACP port
pub const DEFAULT_PORT: u16 = 3689;

/// Configuration for a [`DacpClient`](crate::DacpClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name or address of the server
    /// Default: "localhost"
    pub host: String,

    /// Server port
    /// Default: 3689
    pub port: u16,

    /// Session id attached to every authenticated request
    /// Default: 51
    pub session_id: u32,

    /// Pairing GUID presented at login
    /// Default: "0x1"
    pub pairing_guid: String,

    /// TCP connect timeout
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Read timeout for the response body
    /// Default: 10 seconds
    pub read_timeout: Duration,

    /// Retries when the server has no room for a new session
    /// Default: 3 retries, exponential backoff from 100ms
    pub login_retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            session_id: 51,
            pairing_guid: "0x1".to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            login_retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Create a ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with overrides from the environment
    ///
    /// - `DACP_HOST`
    /// - `DACP_PORT`
    /// - `DACP_SESSION_ID`
    /// - `DACP_PAIRING_GUID`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("DACP_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("DACP_PORT") {
            config.port = port
                .parse()
                .map_err(|_| ApiError::InvalidParameter(format!("DACP_PORT '{}' is not a port", port)))?;
        }
        if let Some(session_id) = lookup("DACP_SESSION_ID") {
            config.session_id = session_id.parse().map_err(|_| {
                ApiError::InvalidParameter(format!("DACP_SESSION_ID '{}' is not an integer", session_id))
            })?;
        }
        if let Some(guid) = lookup("DACP_PAIRING_GUID") {
            config.pairing_guid = guid;
        }

        Ok(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_session_id(mut self, session_id: u32) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_pairing_guid(mut self, guid: impl Into<String>) -> Self {
        self.pairing_guid = guid.into();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn with_login_retry(mut self, policy: RetryPolicy) -> Self {
        self.login_retry = policy;
        self
    }

    /// `http://host:port`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:3689");
        assert_eq!(config.session_id, 51);
        assert_eq!(config.pairing_guid, "0x1");
        assert_eq!(config.login_retry, RetryPolicy::default());
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new()
            .with_host("10.0.0.7")
            .with_port(3690)
            .with_session_id(1234)
            .with_login_retry(RetryPolicy::none());

        assert_eq!(config.base_url(), "http://10.0.0.7:3690");
        assert_eq!(config.session_id, 1234);
        assert_eq!(config.login_retry.max_retries, 0);
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("DACP_HOST", "speakers.local"),
            ("DACP_PORT", "3700"),
            ("DACP_SESSION_ID", "99"),
        ]))
        .unwrap();

        assert_eq!(config.host, "speakers.local");
        assert_eq!(config.port, 3700);
        assert_eq!(config.session_id, 99);
        assert_eq!(config.pairing_guid, "0x1");
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let err = ClientConfig::from_lookup(lookup_from(&[("DACP_PORT", "seventy")])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter(_)));

        let err = ClientConfig::from_lookup(lookup_from(&[("DACP_SESSION_ID", "-1")])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter(_)));
    }
}
