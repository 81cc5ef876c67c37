//! Key-prefix namespaces.

use snafu::ResultExt;
use snafu::Snafu;

use crate::tuple::Tuple;
use crate::tuple::TupleError;

/// Errors from decoding a key through a [`Subspace`].
#[derive(Debug, Snafu)]
pub enum SubspaceError {
    /// The key does not start with the subspace prefix.
    #[snafu(display("key of {key_len} bytes is outside subspace with {prefix_len}-byte prefix"))]
    OutsideSubspace {
        /// Length of the rejected key.
        key_len: usize,
        /// Length of the subspace prefix.
        prefix_len: usize,
    },

    /// The bytes after the prefix are not a valid packed tuple.
    #[snafu(display("failed to unpack key suffix: {source}"))]
    Unpack {
        /// Underlying codec error.
        source: TupleError,
    },
}

/// A raw byte prefix that scopes a family of keys.
///
/// Every key packed by a subspace starts with its prefix, and a child
/// subspace's prefix extends its parent's, so sibling subspaces never overlap
/// and a child's [`range`](Self::range) is nested inside its parent's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Subspace {
    raw_prefix: Vec<u8>,
}

impl Subspace {
    /// Subspace whose prefix is the packed `tuple`.
    pub fn new(tuple: &Tuple) -> Self {
        Self { raw_prefix: tuple.pack() }
    }

    /// Subspace over an arbitrary raw prefix.
    pub fn from_bytes(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            raw_prefix: prefix.into(),
        }
    }

    pub fn raw_prefix(&self) -> &[u8] {
        &self.raw_prefix
    }

    /// Child subspace: this prefix followed by the packed `suffix`.
    pub fn subspace(&self, suffix: &Tuple) -> Subspace {
        Subspace {
            raw_prefix: self.pack(suffix),
        }
    }

    /// Key for `tuple` inside this subspace.
    pub fn pack(&self, tuple: &Tuple) -> Vec<u8> {
        let mut key = self.raw_prefix.clone();
        tuple.pack_into(&mut key);
        key
    }

    /// Decode the tuple following this subspace's prefix.
    pub fn unpack(&self, key: &[u8]) -> Result<Tuple, SubspaceError> {
        let suffix = key.strip_prefix(self.raw_prefix.as_slice()).ok_or(SubspaceError::OutsideSubspace {
            key_len: key.len(),
            prefix_len: self.raw_prefix.len(),
        })?;
        Tuple::unpack(suffix).context(UnpackSnafu)
    }

    /// `(begin, end)` covering every tuple key in this subspace.
    ///
    /// `begin` is the prefix followed by `0x00` and `end` the prefix followed by
    /// `0xFF`; no packed element starts with `0xFF`, so every key produced by
    /// [`pack`](Self::pack) with a non-empty tuple falls in `[begin, end)`.
    pub fn range(&self) -> (Vec<u8>, Vec<u8>) {
        let mut begin = self.raw_prefix.clone();
        begin.push(0x00);
        let mut end = self.raw_prefix.clone();
        end.push(0xFF);
        (begin, end)
    }

    /// Whether `key` starts with this subspace's prefix.
    pub fn contains(&self, key: &[u8]) -> bool {
        key.starts_with(&self.raw_prefix)
    }
}
