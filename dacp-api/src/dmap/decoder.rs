//! Recursive TLV stream decoder

use bytes::Buf;

use super::{DecodeError, Node, Response, Tag, TagKind};

/// Tag plus big-endian length
pub const FRAME_HEADER_LEN: usize = 8;

/// Deepest branch nesting accepted before the stream is treated as corrupt
pub const MAX_DEPTH: usize = 32;

/// Decode a complete response body
pub fn decode(body: &[u8]) -> Result<Response, DecodeError> {
    let mut buf = body;
    decode_scope(&mut buf, body.len())
}

/// Decode exactly `scope` bytes from `buf`
///
/// Fails if the stream runs out first or if any frame claims more bytes than
/// are left in its enclosing scope.
pub fn decode_scope<B: Buf>(buf: &mut B, scope: usize) -> Result<Response, DecodeError> {
    decode_level(buf, scope, 0)
}

fn decode_level<B: Buf>(buf: &mut B, scope: usize, depth: usize) -> Result<Response, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::TooDeep(MAX_DEPTH));
    }

    let mut response = Response::new();
    let mut remaining = scope;
    let mut consumed = 0;

    while remaining > 0 {
        ensure_available(buf, FRAME_HEADER_LEN)?;
        let mut raw_tag = [0u8; 4];
        buf.copy_to_slice(&mut raw_tag);
        let tag = Tag::from_bytes(raw_tag)?;
        let length = buf.get_u32() as usize;

        let frame_len = FRAME_HEADER_LEN + length;
        if frame_len > remaining {
            return Err(DecodeError::ScopeOverrun {
                tag: tag.to_string(),
                length,
                remaining,
            });
        }
        remaining -= frame_len;
        consumed += frame_len;

        ensure_available(buf, length)?;
        let value = match tag.kind() {
            TagKind::Branch => Node::Branch(decode_level(buf, length, depth + 1)?),
            TagKind::String => Node::String(read_string(buf, length)),
            TagKind::Raw => Node::Raw(buf.copy_to_bytes(length)),
            TagKind::Inferred => match length {
                1 | 2 | 4 | 8 => Node::UInt(buf.get_uint(length)),
                _ => Node::String(read_string(buf, length)),
            },
        };

        response.push(tag, consumed, value);
    }

    Ok(response)
}

fn ensure_available<B: Buf>(buf: &B, needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated {
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

fn read_string<B: Buf>(buf: &mut B, length: usize) -> String {
    let bytes = buf.copy_to_bytes(length);
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dmap::{tags, StreamWriter};

    #[test]
    fn test_single_byte_is_unsigned() {
        let body = StreamWriter::new().field(tags::CAIA, &[0xff]).finish();

        let response = decode(&body).unwrap();
        assert_eq!(response.uint("caia").unwrap(), 255);
    }

    #[test]
    fn test_eight_byte_high_bit_is_unsigned() {
        let body = StreamWriter::new().field(tags::MSMA, &[0xff; 8]).finish();

        let response = decode(&body).unwrap();
        assert_eq!(response.uint("msma").unwrap(), u64::MAX);
    }

    #[test]
    fn test_length_inference() {
        let body = StreamWriter::new()
            .field("abcd".parse().unwrap(), &[0x00, 0x2a])
            .field("efgh".parse().unwrap(), b"abc")
            .field("ijkl".parse().unwrap(), b"four")
            .finish();

        let response = decode(&body).unwrap();
        assert_eq!(response.uint("abcd").unwrap(), 42);
        assert_eq!(response.string("efgh").unwrap(), "abc");
        // four bytes under an unclassified tag is a number, even if it spells text
        assert_eq!(response.uint("ijkl").unwrap(), u32::from_be_bytes(*b"four") as u64);
    }

    #[test]
    fn test_forced_string_tag_keeps_numeric_length_as_text() {
        let body = StreamWriter::new().string(tags::MINM, "Den!").finish();

        let response = decode(&body).unwrap();
        assert_eq!(response.string("minm").unwrap(), "Den!");
    }

    #[test]
    fn test_forced_raw_tag() {
        let body = StreamWriter::new().raw(tags::CANP, &[0, 1, 2, 3]).finish();

        let response = decode(&body).unwrap();
        assert_eq!(response.raw("canp").unwrap(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_zero_length_payloads() {
        let body = StreamWriter::new()
            .field(tags::CASP, &[])
            .field(tags::MINM, &[])
            .field("zzzz".parse().unwrap(), &[])
            .finish();

        let response = decode(&body).unwrap();
        assert!(response.branch("casp").unwrap().is_empty());
        assert_eq!(response.string("minm").unwrap(), "");
        assert_eq!(response.string("zzzz").unwrap(), "");
    }

    #[test]
    fn test_collision_keys_use_cumulative_offsets() {
        let body = StreamWriter::new()
            .branch(tags::CASP, |list| {
                list.uint_sized(tags::MSTT, 200, 4)
                    .branch(tags::MDCL, |s| s.string(tags::MINM, "A"))
                    .branch(tags::MDCL, |s| s.string(tags::MINM, "B"))
                    .branch(tags::MDCL, |s| s.string(tags::MINM, "C"))
            })
            .finish();

        let response = decode(&body).unwrap();
        let list = response.branch("casp").unwrap();
        let keys: Vec<&str> = list.keys().collect();
        // mstt = 12 bytes, each mdcl = 8 + (8 + 1) = 17 bytes
        assert_eq!(keys, vec!["mstt", "mdcl", "mdcl[000046]", "mdcl[000063]"]);
        assert_eq!(list.fields()[1].offset(), 29);
    }

    #[test]
    fn test_scope_overrun_is_error() {
        // mstt claims one byte more than casp has left
        let mut body = Vec::new();
        body.extend_from_slice(b"casp");
        body.extend_from_slice(&18u32.to_be_bytes());
        body.extend_from_slice(b"mstt");
        body.extend_from_slice(&11u32.to_be_bytes());
        body.extend_from_slice(&[0; 10]);

        let err = decode(&body).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ScopeOverrun {
                tag: "mstt".to_string(),
                length: 11,
                remaining: 18,
            }
        );
    }

    #[test]
    fn test_header_longer_than_scope_is_overrun() {
        let mut buf: &[u8] = &[b'm', b's', b't', b't', 0, 0, 0, 0];

        let err = decode_scope(&mut buf, 4).unwrap_err();
        assert!(matches!(err, DecodeError::ScopeOverrun { remaining: 4, .. }));
    }

    #[test]
    fn test_truncated_header_and_payload() {
        let err = decode(b"mst").unwrap_err();
        assert_eq!(err, DecodeError::Truncated { needed: 8, available: 3 });

        let mut buf: &[u8] = &[b'm', b's', b't', b't', 0, 0, 0, 4, 0, 1];
        let err = decode_scope(&mut buf, 12).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { needed: 4, available: 2 });
    }

    #[test]
    fn test_non_ascii_tag_is_error() {
        let body = [0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 0];

        assert!(matches!(decode(&body), Err(DecodeError::InvalidTag(_))));
    }

    #[test]
    fn test_nesting_cap() {
        let mut body = Vec::new();
        for _ in 0..=MAX_DEPTH + 1 {
            let mut outer = Vec::with_capacity(body.len() + FRAME_HEADER_LEN);
            outer.extend_from_slice(b"casp");
            outer.extend_from_slice(&(body.len() as u32).to_be_bytes());
            outer.extend_from_slice(&body);
            body = outer;
        }

        assert_eq!(decode(&body).unwrap_err(), DecodeError::TooDeep(MAX_DEPTH));
    }

    #[test]
    fn test_empty_body_is_empty_response() {
        assert!(decode(&[]).unwrap().is_empty());
    }
}
