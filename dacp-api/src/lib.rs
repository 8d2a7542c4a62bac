//! Client for the DACP remote-control protocol
//!
//! This crate discovers and controls the speakers behind a DACP server:
//! listing them, choosing which are active, and reading or changing volume.
//! Commands are plain HTTP GETs sent through the private `http-client` crate;
//! answers are binary DMAP tag-length-value streams decoded by [`dmap`].
//!
//! ```rust,no_run
//! use dacp_api::{ClientConfig, DacpClient};
//!
//! let client = DacpClient::new(ClientConfig::from_env()?);
//! client.login()?;
//! println!("master volume: {:.0}%", client.get_master_volume()?);
//!
//! let speakers = client.get_speakers()?;
//! let ids: Vec<_> = speakers.iter().map(|s| s.id.clone()).collect();
//! client.set_active_speakers(&ids)?;
//! client.logout()?;
//! # Ok::<(), dacp_api::ApiError>(())
//! ```
//!
//! # Fades
//!
//! Gradual volume changes run in the background and can be stopped at any
//! time:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use dacp_api::{CancellationToken, ClientConfig, DacpClient, Fade};
//!
//! let client = Arc::new(DacpClient::new(ClientConfig::default()));
//! client.login()?;
//!
//! let fade = Fade::new("0x2ab", 10.0, 60.0, Duration::from_secs(5))?
//!     .spawn(Arc::clone(&client), CancellationToken::new());
//! fade.cancel();
//! fade.join()?;
//! # Ok::<(), dacp_api::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod dmap;
pub mod error;
pub mod fade;
pub mod logging;
pub mod request;
pub mod retry;
pub mod speaker;

pub use client::{DacpClient, SessionState};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use fade::{apply_fade, CancellationToken, Fade, FadeHandle, FadeOutcome, VolumeControl};
pub use request::{Command, RequestBuilder};
pub use retry::RetryPolicy;
pub use speaker::{Speaker, SpeakerId};
