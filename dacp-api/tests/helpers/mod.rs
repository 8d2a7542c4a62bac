//! Test helpers: canned server responses and a mock DACP server

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use dacp_api::dmap::{tags, StreamWriter};
use dacp_api::{ClientConfig, DacpClient, RetryPolicy};
use mockito::{Matcher, Mock, ServerGuard};

pub const SESSION_ID: u32 = 51;

/// A speaker entry as the server would report it
#[derive(Debug, Clone)]
pub struct SpeakerFixture {
    pub name: &'static str,
    pub id: u64,
    pub volume_raw: u64,
    pub active: bool,
}

impl SpeakerFixture {
    pub fn new(name: &'static str, id: u64, volume_raw: u64, active: bool) -> Self {
        Self {
            name,
            id,
            volume_raw,
            active,
        }
    }

    fn write(&self, entry: StreamWriter) -> StreamWriter {
        entry
            .string(tags::MINM, self.name)
            .uint(tags::CAIA, if self.active { 1 } else { 0 })
            .uint_sized(tags::MSMA, self.id, 8)
            .uint_sized(tags::CMVO, self.volume_raw, 4)
    }
}

/// `mlog { mstt: 200, mlid: <session> }`
pub fn login_ok_body() -> Bytes {
    StreamWriter::new()
        .branch(tags::MLOG, |log| {
            log.uint_sized(tags::MSTT, 200, 4)
                .uint_sized(tags::MLID, SESSION_ID as u64, 4)
        })
        .finish()
}

/// `mlog { mstt: 503, msts: "Could not start session" }`
pub fn login_refused_body() -> Bytes {
    StreamWriter::new()
        .branch(tags::MLOG, |log| {
            log.uint_sized(tags::MSTT, 503, 4)
                .string(tags::MSTS, "Could not start session")
        })
        .finish()
}

/// `casp { mstt: 200, mdcl {...}, mdcl {...}, ... }`
pub fn speakers_body(speakers: &[SpeakerFixture]) -> Bytes {
    StreamWriter::new()
        .branch(tags::CASP, |list| {
            speakers.iter().fold(list.uint_sized(tags::MSTT, 200, 4), |list, speaker| {
                list.branch(tags::MDCL, |entry| speaker.write(entry))
            })
        })
        .finish()
}

/// Empty status-only answer used by set commands and logout
pub fn status_ok_body() -> Bytes {
    StreamWriter::new().uint_sized(tags::MSTT, 200, 4).finish()
}

/// Client pointed at the mock server, retrying login twice without delay
pub fn client_for(server: &ServerGuard) -> DacpClient {
    let addr: SocketAddr = server
        .host_with_port()
        .parse()
        .expect("mock server address");
    let config = ClientConfig::default()
        .with_host(addr.ip().to_string())
        .with_port(addr.port())
        .with_session_id(SESSION_ID)
        .with_timeouts(Duration::from_secs(2), Duration::from_secs(2))
        .with_login_retry(RetryPolicy::fixed(2, Duration::ZERO));
    DacpClient::new(config)
}

pub fn session_query() -> Matcher {
    Matcher::UrlEncoded("session-id".into(), SESSION_ID.to_string())
}

pub fn mock_login(server: &mut ServerGuard, body: Bytes) -> Mock {
    server
        .mock("GET", "/login")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pairing-guid".into(), "0x1".into()),
            Matcher::UrlEncoded("request-session-id".into(), SESSION_ID.to_string()),
        ]))
        .with_status(200)
        .with_body(body)
        .create()
}

pub fn mock_logout(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/logout")
        .match_query(session_query())
        .with_status(200)
        .with_body(status_ok_body())
        .create()
}

/// A client that has already completed a successful login
pub fn logged_in_client(server: &mut ServerGuard) -> DacpClient {
    let _login = mock_login(server, login_ok_body());
    let client = client_for(server);
    client.login().expect("login against mock server");
    client
}
