//! Ordered key encoding and namespace isolation for transactional key-value stores.
//!
//! Two primitives live here:
//!
//! - [`Tuple`]: order-preserving serialization of composite keys. Packed tuples compare as raw bytes
//!   in the same order as the logical tuples, so an ordered store can range-scan them.
//! - [`Subspace`]: a raw byte prefix scoping a family of keys. Child subspaces are formed by
//!   concatenation, so a child's range is always a contiguous sub-range of its parent's.
//!
//! The encoding follows the [FoundationDB Tuple Layer](
//! https://github.com/apple/foundationdb/blob/main/design/tuple.md) for the element types it
//! supports (null, byte strings, UTF-8 strings, signed 64-bit integers).
//!
//! # Example
//!
//! ```
//! use aspen_layer::Subspace;
//! use aspen_layer::Tuple;
//!
//! let queue = Subspace::new(&Tuple::new().push("jobs"));
//! let items = queue.subspace(&Tuple::new().push("item"));
//!
//! let key = items.pack(&Tuple::new().push(7i64).push(vec![0xAAu8; 4]));
//! assert!(items.contains(&key));
//! assert!(queue.contains(&key));
//!
//! let decoded = items.unpack(&key).unwrap();
//! assert_eq!(decoded.get_int(0), Some(7));
//! ```

mod subspace;
mod tuple;

#[cfg(test)]
mod proptest;

pub use subspace::Subspace;
pub use subspace::SubspaceError;
pub use tuple::Element;
pub use tuple::Tuple;
pub use tuple::TupleError;
