//! TLV stream construction
//!
//! Mostly useful for building canned server responses in tests and mock
//! servers; the client itself only ever decodes.

use bytes::{BufMut, Bytes, BytesMut};

use super::Tag;

/// Builds a TLV byte stream field by field
///
/// ```rust
/// use dacp_api::dmap::{decode, tags, StreamWriter};
///
/// let body = StreamWriter::new()
///     .branch(tags::CASP, |list| {
///         list.branch(tags::MDCL, |speaker| {
///             speaker.string(tags::MINM, "Kitchen").uint(tags::CMVO, 4500)
///         })
///     })
///     .finish();
///
/// let response = decode(&body).unwrap();
/// assert_eq!(response.branch("casp").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamWriter {
    buf: BytesMut,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame with an arbitrary payload
    pub fn field(mut self, tag: Tag, payload: &[u8]) -> Self {
        self.buf.put_slice(tag.as_bytes());
        self.buf.put_u32(payload.len() as u32);
        self.buf.put_slice(payload);
        self
    }

    pub fn string(self, tag: Tag, text: &str) -> Self {
        self.field(tag, text.as_bytes())
    }

    pub fn raw(self, tag: Tag, bytes: &[u8]) -> Self {
        self.field(tag, bytes)
    }

    /// Append an unsigned integer in the narrowest of 1, 2, 4 or 8 bytes
    pub fn uint(self, tag: Tag, value: u64) -> Self {
        let width = if value <= u8::MAX as u64 {
            1
        } else if value <= u16::MAX as u64 {
            2
        } else if value <= u32::MAX as u64 {
            4
        } else {
            8
        };
        self.uint_sized(tag, value, width)
    }

    /// Append an unsigned integer using exactly `width` big-endian bytes
    ///
    /// # Panics
    /// If `width` is greater than 8.
    pub fn uint_sized(self, tag: Tag, value: u64, width: usize) -> Self {
        let mut payload = BytesMut::with_capacity(width);
        payload.put_uint(value, width);
        self.field(tag, &payload)
    }

    /// Append a branch whose contents are written by `build`
    pub fn branch(self, tag: Tag, build: impl FnOnce(StreamWriter) -> StreamWriter) -> Self {
        let child = build(StreamWriter::new());
        self.field(tag, &child.buf)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
