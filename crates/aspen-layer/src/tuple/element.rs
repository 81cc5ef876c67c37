use std::cmp::Ordering;

use super::encoding;

/// A single typed component of a [`Tuple`](super::Tuple).
///
/// Elements order the same way their packed bytes do: null first, then byte
/// strings, then strings, then integers by numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    /// Null value.
    Null,

    /// Raw byte string.
    Bytes(Vec<u8>),

    /// UTF-8 string.
    String(String),

    /// Signed 64-bit integer.
    Int(i64),
}

impl Element {
    /// Returns the integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Element::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Element::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the string, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::String(s) => Some(s),
            _ => None,
        }
    }

    pub(super) fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Element::Null => encoding::encode_null(buf),
            Element::Bytes(bytes) => encoding::encode_bytes(bytes, buf),
            Element::String(s) => encoding::encode_string(s, buf),
            Element::Int(n) => encoding::encode_int(*n, buf),
        }
    }
}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut lhs = Vec::new();
        let mut rhs = Vec::new();
        self.encode_into(&mut lhs);
        other.encode_into(&mut rhs);
        lhs.cmp(&rhs)
    }
}

impl From<()> for Element {
    fn from(_: ()) -> Self {
        Element::Null
    }
}

impl From<Vec<u8>> for Element {
    fn from(v: Vec<u8>) -> Self {
        Element::Bytes(v)
    }
}

impl From<&[u8]> for Element {
    fn from(v: &[u8]) -> Self {
        Element::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Element {
    fn from(v: [u8; N]) -> Self {
        Element::Bytes(v.to_vec())
    }
}

impl From<String> for Element {
    fn from(s: String) -> Self {
        Element::String(s)
    }
}

impl From<&str> for Element {
    fn from(s: &str) -> Self {
        Element::String(s.to_string())
    }
}

impl From<i64> for Element {
    fn from(n: i64) -> Self {
        Element::Int(n)
    }
}

impl From<i32> for Element {
    fn from(n: i32) -> Self {
        Element::Int(i64::from(n))
    }
}

impl From<u32> for Element {
    fn from(n: u32) -> Self {
        Element::Int(i64::from(n))
    }
}
