//! DMAP tag-length-value decoding
//!
//! Every DACP response body is a stream of frames:
//!
//! ```text
//! tag:     4 bytes, ASCII
//! length:  4 bytes, big-endian unsigned
//! payload: `length` bytes
//! ```
//!
//! A frame's payload is either a nested stream (branch tags), text, opaque
//! bytes, or an unsigned integer. Which one is decided by the tag tables in
//! [`tag`], falling back to the payload length for unclassified tags.

mod decoder;
mod node;
mod tag;
mod writer;

pub use decoder::{decode, decode_scope, FRAME_HEADER_LEN, MAX_DEPTH};
pub use node::{Field, Node, NodeKind, Response};
pub use tag::{tags, Tag, TagKind, BRANCH_TAGS, RAW_TAGS, STRING_TAGS};
pub use writer::StreamWriter;

use thiserror::Error;

/// Errors raised while decoding a TLV stream
///
/// Any of these aborts the whole decode; partial trees are never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stream ended before the declared scope was consumed
    #[error("Truncated stream: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// A frame's declared length runs past the end of its enclosing scope
    #[error("Frame '{tag}' of length {length} overruns remaining scope of {remaining} bytes")]
    ScopeOverrun { tag: String, length: usize, remaining: usize },

    /// Tag bytes were not ASCII
    #[error("Invalid tag bytes {0:02x?}")]
    InvalidTag([u8; 4]),

    /// A tag name that is not exactly four ASCII characters
    #[error("Invalid tag name '{0}'")]
    InvalidTagName(String),

    /// Branches nested deeper than the decoder allows
    #[error("Branch nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// An accessor was used on a field that is absent or of another kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Field '{key}': expected {expected}, found {}",
    .found.map_or("nothing", |kind| kind.name())
)]
pub struct TypeMismatch {
    pub key: String,
    pub expected: NodeKind,
    /// `None` when the field is absent
    pub found: Option<NodeKind>,
}
