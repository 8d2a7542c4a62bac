//! Speaker records read from a getspeakers response

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dmap::{tags, Node, Response};
use crate::Result;

/// Identifier of a speaker, rendered as `0x` followed by lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeakerId(String);

impl SpeakerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Format a numeric id as the protocol expects it
    pub fn from_raw(id: u64) -> Self {
        Self(format!("0x{:x}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpeakerId {
    fn from(s: &str) -> Self {
        SpeakerId::new(s)
    }
}

impl From<String> for SpeakerId {
    fn from(s: String) -> Self {
        SpeakerId::new(s)
    }
}

/// Snapshot of one speaker as reported by a single getspeakers call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    pub id: SpeakerId,
    pub active: bool,
    /// Volume in percent, 0 to 100
    pub volume_pct: f64,
}

impl Speaker {
    /// Map one `mdcl` entry to a speaker
    ///
    /// The name comes from `minm`; entries without one fall back to a
    /// textual `caia`. A speaker is active when `caia` is numerically 1.
    pub fn from_response(entry: &Response) -> Result<Self> {
        let name = match entry.get(tags::MINM.as_str()) {
            Some(_) => entry.string(tags::MINM.as_str())?.to_string(),
            None => entry.string(tags::CAIA.as_str())?.to_string(),
        };
        let active = matches!(entry.get(tags::CAIA.as_str()), Some(Node::UInt(1)));
        let id = SpeakerId::from_raw(entry.uint(tags::MSMA.as_str())?);
        let volume_pct = entry.uint(tags::CMVO.as_str())? as f64 / 100.0;

        Ok(Self {
            name,
            id,
            active,
            volume_pct,
        })
    }
}
