use std::thread;
use std::time::Duration;

use http_client::{HttpClient, HttpError};
use parking_lot::RwLock;

use crate::config::ClientConfig;
use crate::dmap::{self, tags, Node, Response};
use crate::fade::VolumeControl;
use crate::request::{Command, RequestBuilder};
use crate::speaker::{Speaker, SpeakerId};
use crate::{ApiError, Result};

/// Status text a server sends when it has no slot for another session
pub const SESSION_UNAVAILABLE: &str = "Could not start session";

/// Property name for volume in getproperty/setproperty
const VOLUME_PROPERTY: &str = "dmcp.volume";

/// Whether the client currently holds a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// A session-based client for a DACP remote-control server
///
/// The session id comes from [`ClientConfig`] and never changes; `login`
/// registers it with the server and `logout` releases it. Every other
/// operation fails with [`ApiError::NotAuthenticated`] until `login` has
/// succeeded.
///
/// Each call is one blocking GET followed by a full decode of the body. The
/// client is `Send + Sync` and can be shared through an `Arc`, for instance
/// with a running [`Fade`](crate::Fade).
///
/// # Example
/// ```rust,no_run
/// use dacp_api::{ClientConfig, DacpClient};
///
/// let client = DacpClient::new(ClientConfig::default().with_session_id(51));
/// client.login()?;
/// for speaker in client.get_speakers()? {
///     println!("{} ({}) at {:.0}%", speaker.name, speaker.id, speaker.volume_pct);
/// }
/// client.logout()?;
/// # Ok::<(), dacp_api::ApiError>(())
/// ```
#[derive(Debug)]
pub struct DacpClient {
    config: ClientConfig,
    http: HttpClient,
    state: RwLock<SessionState>,
}

impl DacpClient {
    pub fn new(config: ClientConfig) -> Self {
        let http = HttpClient::with_timeouts(config.connect_timeout, config.read_timeout);
        Self::with_http_client(config, http)
    }

    /// Create a client around an existing HTTP client
    pub fn with_http_client(config: ClientConfig, http: HttpClient) -> Self {
        Self {
            config,
            http,
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session_id(&self) -> u32 {
        self.config.session_id
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Start a request for `command` against this client's server
    pub fn request(&self, command: Command) -> RequestBuilder {
        RequestBuilder::new(self.config.base_url(), command, self.config.session_id)
    }

    /// Send a request and decode the response body
    ///
    /// Commands that need a session are refused locally while
    /// unauthenticated. A 403 answer to such a command means the server no
    /// longer recognises our session: the client drops back to
    /// unauthenticated and reports [`ApiError::SessionExpired`].
    pub fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let command = request.command();
        if command.requires_session() && !self.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }

        let url = request.build()?;
        tracing::debug!("DACP request: {}", url);

        let body = match self.http.get(url.as_str()) {
            Ok(body) => body,
            Err(HttpError::Status(403)) if command.requires_session() => {
                tracing::warn!(
                    "Server rejected session {} on {}",
                    self.config.session_id,
                    command.path()
                );
                self.set_state(SessionState::Unauthenticated);
                return Err(ApiError::SessionExpired);
            }
            Err(e) => return Err(e.into()),
        };

        let response = dmap::decode(&body)?;
        tracing::debug!(
            "Decoded {} top-level fields from {} byte {} response",
            response.len(),
            body.len(),
            command.path()
        );
        Ok(response)
    }

    /// Register the configured session id with the server
    ///
    /// When the server answers that it cannot start a session, the client
    /// logs out, backs off per [`ClientConfig::login_retry`] and tries again,
    /// giving up with [`ApiError::LoginRejected`] once the policy is spent.
    pub fn login(&self) -> Result<Response> {
        let policy = self.config.login_retry;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self.execute(
                self.request(Command::Login)
                    .param("pairing-guid", &self.config.pairing_guid)
                    .param("request-session-id", self.config.session_id),
            )?;
            tracing::debug!("Login response:\n{}", response);

            let status = response.branch(tags::MLOG.as_str())?;
            let refused = matches!(
                status.get(tags::MSTS.as_str()),
                Some(Node::String(text)) if text == SESSION_UNAVAILABLE
            );

            if !refused {
                if let Ok(granted) = status.uint(tags::MLID.as_str()) {
                    tracing::debug!("Server reports session id {}", granted);
                }
                self.set_state(SessionState::Authenticated);
                tracing::info!("Logged in with session id {}", self.config.session_id);
                return Ok(response);
            }

            // Any session held before this call is gone once the server refuses
            self.set_state(SessionState::Unauthenticated);

            if attempt >= policy.max_attempts() {
                tracing::warn!("Giving up on login after {} attempts", attempt);
                return Err(ApiError::LoginRejected {
                    attempts: attempt,
                    reason: SESSION_UNAVAILABLE.to_string(),
                });
            }

            tracing::warn!(
                "Login attempt {} refused ({}), retrying",
                attempt,
                SESSION_UNAVAILABLE
            );
            // Release whatever slot the server may still hold for this id
            if let Err(e) = self.send_logout() {
                tracing::debug!("Logout before login retry failed: {}", e);
            }

            let delay = policy.delay_for_attempt(attempt);
            if delay > Duration::ZERO {
                thread::sleep(delay);
            }
        }
    }

    /// Release the session; the decoded response is returned as-is
    pub fn logout(&self) -> Result<Response> {
        let result = self.send_logout();
        self.set_state(SessionState::Unauthenticated);
        if result.is_ok() {
            tracing::info!("Logged out session {}", self.config.session_id);
        }
        result
    }

    /// List the speakers the server knows about
    pub fn get_speakers(&self) -> Result<Vec<Speaker>> {
        let response = self.execute(self.request(Command::GetSpeakers).with_session_id())?;
        let list = response.branch(tags::CASP.as_str())?;

        list.find_branches(tags::MDCL.as_str())?
            .into_iter()
            .map(Speaker::from_response)
            .collect()
    }

    /// Make exactly the given speakers the active output set
    pub fn set_active_speakers(&self, ids: &[SpeakerId]) -> Result<Response> {
        if ids.is_empty() {
            return Err(ApiError::InvalidParameter(
                "At least one speaker id is required".to_string(),
            ));
        }

        let joined = ids
            .iter()
            .map(SpeakerId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.execute(
            self.request(Command::SetSpeakers)
                .param("speaker-id", joined)
                .with_session_id(),
        )
    }

    /// Master volume in percent
    pub fn get_master_volume(&self) -> Result<f64> {
        let response = self.execute(
            self.request(Command::GetProperty)
                .param("properties", VOLUME_PROPERTY)
                .with_session_id(),
        )?;

        // Some servers answer flat, others wrap the property in cmgt
        let raw = if response.contains_key(tags::CMVO.as_str()) {
            response.uint(tags::CMVO.as_str())?
        } else {
            response
                .branch(tags::CMGT.as_str())?
                .uint(tags::CMVO.as_str())?
        };

        Ok(raw as f64 / 100.0)
    }

    /// Set the master volume, in percent
    pub fn set_master_volume(&self, volume_pct: f64) -> Result<Response> {
        let raw = volume_to_raw(volume_pct)?;
        self.execute(
            self.request(Command::SetProperty)
                .param(VOLUME_PROPERTY, raw)
                .with_session_id(),
        )
    }

    /// Set one speaker's volume, in percent
    pub fn set_speaker_volume(&self, id: &SpeakerId, volume_pct: f64) -> Result<Response> {
        let raw = volume_to_raw(volume_pct)?;
        self.execute(
            self.request(Command::SetProperty)
                .param("include-speaker-id", id)
                .param(VOLUME_PROPERTY, raw)
                .with_session_id(),
        )
    }

    fn send_logout(&self) -> Result<Response> {
        self.execute(self.request(Command::Logout).with_session_id())
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }
}

impl VolumeControl for DacpClient {
    fn set_speaker_volume(&self, id: &SpeakerId, volume_pct: f64) -> Result<()> {
        DacpClient::set_speaker_volume(self, id, volume_pct).map(|_| ())
    }
}

/// Percent to the protocol's hundredths, the inverse of the getters' scaling
pub(crate) fn volume_to_raw(volume_pct: f64) -> Result<u32> {
    if !volume_pct.is_finite() || !(0.0..=100.0).contains(&volume_pct) {
        return Err(ApiError::InvalidParameter(format!(
            "Volume {} is outside 0-100",
            volume_pct
        )));
    }
    Ok((volume_pct * 100.0).round() as u32)
}
