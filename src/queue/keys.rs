//! Key and value layout for the three queue record families.
//!
//! ```text
//! root / "item"     / (index, suffix) -> (payload,)
//! root / "pop"      / (index, id)     -> ""
//! root / "conflict" / (id,)           -> stored item value
//! ```

use aspen_layer::Subspace;
use aspen_layer::Tuple;
use snafu::ResultExt;

use crate::constants::RANDOM_ID_LEN;
use crate::error::CodecSnafu;
use crate::error::KeyDecodeSnafu;
use crate::error::QueueError;
use crate::error::printable;
use crate::random::RandomId;

/// Key of an `(index, id)` record: items and waiters share this shape.
pub(crate) fn indexed_key(space: &Subspace, index: i64, id: &RandomId) -> Vec<u8> {
    space.pack(&Tuple::new().push(index).push(id.as_slice()))
}

/// Result slot of the waiter registered under `id`.
pub(crate) fn result_key(results: &Subspace, id: &RandomId) -> Vec<u8> {
    results.pack(&Tuple::new().push(id.as_slice()))
}

/// Leading index of an `(index, ...)` key in `space`.
pub(crate) fn decode_index(space: &Subspace, key: &[u8]) -> Result<i64, QueueError> {
    let tuple = space.unpack(key).context(KeyDecodeSnafu { key: printable(key) })?;
    tuple.get_int(0).ok_or_else(|| QueueError::CorruptedKey {
        key: printable(key),
        reason: "first element is not an integer index".into(),
    })
}

/// Random id of a waiter key.
pub(crate) fn decode_waiter_id(waiters: &Subspace, key: &[u8]) -> Result<RandomId, QueueError> {
    let tuple = waiters.unpack(key).context(KeyDecodeSnafu { key: printable(key) })?;
    tuple
        .get_bytes(1)
        .and_then(|bytes| RandomId::try_from(bytes).ok())
        .ok_or_else(|| QueueError::CorruptedKey {
            key: printable(key),
            reason: format!("second element is not a {RANDOM_ID_LEN}-byte waiter id"),
        })
}

pub(crate) fn encode_value(payload: &[u8]) -> Vec<u8> {
    Tuple::new().push(payload).pack()
}

/// Payload of a stored item value read from `key`.
pub(crate) fn decode_value(key: &[u8], value: &[u8]) -> Result<Vec<u8>, QueueError> {
    let tuple = Tuple::unpack(value).context(CodecSnafu { key: printable(key) })?;
    match tuple.get_bytes(0) {
        Some(payload) if tuple.len() == 1 => Ok(payload.to_vec()),
        _ => Err(QueueError::CorruptedValue {
            key: printable(key),
            reason: "expected a single byte-string element".into(),
        }),
    }
}
