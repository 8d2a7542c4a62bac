//! Decoded response tree

use std::fmt;

use bytes::Bytes;

use super::{Tag, TypeMismatch};

/// The kind of a decoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Branch,
    String,
    Raw,
    UInt,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Branch => "branch",
            NodeKind::String => "string",
            NodeKind::Raw => "raw bytes",
            NodeKind::UInt => "unsigned integer",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested stream
    Branch(Response),
    /// Text payload
    String(String),
    /// Opaque payload
    Raw(Bytes),
    /// 1, 2, 4 or 8 byte big-endian payload, always unsigned
    UInt(u64),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Branch(_) => NodeKind::Branch,
            Node::String(_) => NodeKind::String,
            Node::Raw(_) => NodeKind::Raw,
            Node::UInt(_) => NodeKind::UInt,
        }
    }

    pub fn as_branch(&self) -> Option<&Response> {
        match self {
            Node::Branch(response) => Some(response),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Node::UInt(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Node::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// One decoded field and where it sat in its stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    tag: Tag,
    offset: usize,
    key: String,
    value: Node,
}

impl Field {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Bytes consumed in the enclosing scope once this field had been read
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Key this field is stored under
    ///
    /// The first occurrence of a tag uses the bare tag; later ones are
    /// suffixed with their zero-padded offset, e.g. `mdcl[000142]`, so that
    /// sorting keys restores stream order.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Node {
        &self.value
    }

    pub fn is_repeat(&self) -> bool {
        self.key.len() != 4
    }
}

/// One level of a decoded stream
///
/// Fields are kept in stream order and are never modified once the decoder
/// hands the tree back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    fields: Vec<Field>,
}

impl Response {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Append a field. Repeated tags get an offset-suffixed key.
    pub(super) fn push(&mut self, tag: Tag, offset: usize, value: Node) {
        let key = if self.fields.iter().any(|f| f.tag == tag) {
            format!("{}[{:06}]", tag, offset)
        } else {
            tag.to_string()
        };
        self.fields.push(Field {
            tag,
            offset,
            key,
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Keys in stream order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    /// `(key, value)` pairs in stream order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|f| (f.key.as_str(), &f.value))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Every occurrence of `tag` at this level, in stream order
    pub fn all(&self, tag: Tag) -> impl Iterator<Item = &Node> {
        self.fields
            .iter()
            .filter(move |f| f.tag == tag)
            .map(|f| &f.value)
    }

    pub fn branch(&self, key: &str) -> Result<&Response, TypeMismatch> {
        self.typed(key, NodeKind::Branch, Node::as_branch)
    }

    pub fn string(&self, key: &str) -> Result<&str, TypeMismatch> {
        self.typed(key, NodeKind::String, Node::as_str)
    }

    pub fn uint(&self, key: &str) -> Result<u64, TypeMismatch> {
        self.typed(key, NodeKind::UInt, Node::as_uint)
    }

    pub fn raw(&self, key: &str) -> Result<&[u8], TypeMismatch> {
        self.typed(key, NodeKind::Raw, Node::as_raw)
    }

    /// Lowercase hex rendering of an unsigned field, without prefix
    pub fn hex(&self, key: &str) -> Result<String, TypeMismatch> {
        self.uint(key).map(|value| format!("{:x}", value))
    }

    /// All values whose key starts with `prefix`, ordered by key
    ///
    /// This is how repeated sibling fields (one `mdcl` per speaker, say) are
    /// read back as a list.
    pub fn find_array(&self, prefix: &str) -> Vec<&Node> {
        let mut found: Vec<&Field> = self
            .fields
            .iter()
            .filter(|f| f.key.starts_with(prefix))
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        found.into_iter().map(|f| &f.value).collect()
    }

    /// [`find_array`](Self::find_array) for entries that must all be branches
    pub fn find_branches(&self, prefix: &str) -> Result<Vec<&Response>, TypeMismatch> {
        let mut found: Vec<&Field> = self
            .fields
            .iter()
            .filter(|f| f.key.starts_with(prefix))
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        found
            .into_iter()
            .map(|f| {
                f.value.as_branch().ok_or_else(|| TypeMismatch {
                    key: f.key.clone(),
                    expected: NodeKind::Branch,
                    found: Some(f.value.kind()),
                })
            })
            .collect()
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: NodeKind,
        extract: impl FnOnce(&'a Node) -> Option<T>,
    ) -> Result<T, TypeMismatch> {
        let node = self.get(key).ok_or_else(|| TypeMismatch {
            key: key.to_string(),
            expected,
            found: None,
        })?;
        extract(node).ok_or_else(|| TypeMismatch {
            key: key.to_string(),
            expected,
            found: Some(node.kind()),
        })
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for field in &self.fields {
            write!(f, "{:indent$}{}", "", field.key, indent = depth * 2)?;
            match &field.value {
                Node::Branch(child) => {
                    writeln!(f, " --+")?;
                    child.write_indented(f, depth + 1)?;
                }
                Node::String(text) => writeln!(f, " {:?}", text)?,
                Node::Raw(bytes) => writeln!(f, " <{} bytes>", bytes.len())?,
                Node::UInt(value) => writeln!(f, " {}", value)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
