//! Four-character field tags and their type classification

use std::fmt;
use std::str::FromStr;

use super::DecodeError;

/// Tags whose payload is itself a nested TLV stream
pub const BRANCH_TAGS: &[&str] = &[
    "cmst", "mlog", "agal", "mlcl", "mshl", "mlit", "abro", "abar", "apso", "caci", "avdb", "cmgt",
    "aply", "adbs", "casp", "mdcl",
];

/// Tags whose payload is always text, whatever its length
pub const STRING_TAGS: &[&str] = &["minm", "cann", "cana", "cang", "canl", "asaa", "asal", "asar"];

/// Tags whose payload is opaque bytes
pub const RAW_TAGS: &[&str] = &["canp"];

/// How a field's payload is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Nested TLV stream
    Branch,
    /// Forced text
    String,
    /// Forced opaque bytes
    Raw,
    /// Not in any table: 1, 2, 4 or 8 bytes is an unsigned integer, anything else text
    Inferred,
}

/// A 4-byte ASCII field identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Build a tag from a literal. Callers are responsible for passing ASCII.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Build a tag from bytes read off the wire
    pub fn from_bytes(bytes: [u8; 4]) -> Result<Self, DecodeError> {
        if bytes.is_ascii() {
            Ok(Self(bytes))
        } else {
            Err(DecodeError::InvalidTag(bytes))
        }
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// Classify this tag against the static tables
    pub fn kind(&self) -> TagKind {
        let name = self.as_str();
        if BRANCH_TAGS.contains(&name) {
            TagKind::Branch
        } else if STRING_TAGS.contains(&name) {
            TagKind::String
        } else if RAW_TAGS.contains(&name) {
            TagKind::Raw
        } else {
            TagKind::Inferred
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.as_str())
    }
}

impl FromStr for Tag {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| DecodeError::InvalidTagName(s.to_string()))?;
        Self::from_bytes(bytes)
    }
}

/// Tags the client reads or writes by name
pub mod tags {
    use super::Tag;

    /// Login response container
    pub const MLOG: Tag = Tag::new(*b"mlog");
    /// Status text
    pub const MSTS: Tag = Tag::new(*b"msts");
    /// Status code
    pub const MSTT: Tag = Tag::new(*b"mstt");
    /// Session id granted by the server
    pub const MLID: Tag = Tag::new(*b"mlid");
    /// Speaker list container
    pub const CASP: Tag = Tag::new(*b"casp");
    /// One speaker entry
    pub const MDCL: Tag = Tag::new(*b"mdcl");
    /// Item name
    pub const MINM: Tag = Tag::new(*b"minm");
    /// Speaker active indicator
    pub const CAIA: Tag = Tag::new(*b"caia");
    /// Speaker id
    pub const MSMA: Tag = Tag::new(*b"msma");
    /// Volume, scaled by 100
    pub const CMVO: Tag = Tag::new(*b"cmvo");
    /// getproperty response container
    pub const CMGT: Tag = Tag::new(*b"cmgt");
    /// Opaque progress blob
    pub const CANP: Tag = Tag::new(*b"canp");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_branch_tag_classifies_as_branch() {
        for name in BRANCH_TAGS {
            let tag: Tag = name.parse().unwrap();
            assert_eq!(tag.kind(), TagKind::Branch, "{}", name);
        }
    }

    #[test]
    fn test_forced_string_and_raw_tags() {
        assert_eq!(tags::MINM.kind(), TagKind::String);
        assert_eq!("asar".parse::<Tag>().unwrap().kind(), TagKind::String);
        assert_eq!(tags::CANP.kind(), TagKind::Raw);
    }

    #[test]
    fn test_unknown_tag_is_inferred() {
        assert_eq!(tags::CMVO.kind(), TagKind::Inferred);
        assert_eq!("zzzz".parse::<Tag>().unwrap().kind(), TagKind::Inferred);
    }

    #[test]
    fn test_rejects_wrong_length_and_non_ascii() {
        assert!(matches!("abc".parse::<Tag>(), Err(DecodeError::InvalidTagName(_))));
        assert!(matches!(
            Tag::from_bytes([0xff, b'a', b'b', b'c']),
            Err(DecodeError::InvalidTag(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(tags::CASP.to_string(), "casp");
        assert_eq!(format!("{:?}", tags::CASP), "Tag(casp)");
    }
}
