//! Request URL construction
//!
//! Every DACP command is a GET of a fixed path with ordered query parameters.
//! Parameters keep the order they were added in and are never deduplicated.

use url::Url;

use crate::{ApiError, Result};

/// Command paths understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Login,
    Logout,
    GetSpeakers,
    SetSpeakers,
    GetProperty,
    SetProperty,
}

impl Command {
    pub fn path(&self) -> &'static str {
        match self {
            Command::Login => "/login",
            Command::Logout => "/logout",
            Command::GetSpeakers => "/ctrl-int/1/getspeakers",
            Command::SetSpeakers => "/ctrl-int/1/setspeakers",
            Command::GetProperty => "/ctrl-int/1/getproperty",
            Command::SetProperty => "/ctrl-int/1/setproperty",
        }
    }

    /// Whether the command is only valid inside an established session
    pub fn requires_session(&self) -> bool {
        !matches!(self, Command::Login | Command::Logout)
    }
}

/// Fluent builder for a single request URL
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    command: Command,
    session_id: u32,
    params: Vec<(String, String)>,
}

impl RequestBuilder {
    /// # Arguments
    /// * `base_url` - `http://host:port`
    /// * `command` - Command whose path is requested
    /// * `session_id` - Id appended by [`with_session_id`](Self::with_session_id)
    pub fn new(base_url: impl Into<String>, command: Command, session_id: u32) -> Self {
        Self {
            base_url: base_url.into(),
            command,
            session_id,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn with_session_id(self) -> Self {
        let session_id = self.session_id;
        self.param("session-id", session_id)
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Assemble the absolute URL, percent-encoding parameter values
    pub fn build(&self) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, self.command.path());
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::InvalidParameter(format!("Invalid request URL '{}': {}", raw, e)))?;

        if !self.params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.params {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }
}
