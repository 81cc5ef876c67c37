//! Fixed bounds for transactions and the in-memory store.

/// Exclusive upper bound of the user keyspace. Keys at or above it are rejected at commit.
pub const KEYSPACE_END: &[u8] = &[0xFF];

/// Default first backoff between conflicting attempts.
pub const DEFAULT_TRANSACT_INITIAL_BACKOFF_MS: u64 = 10;

/// Default ceiling for the doubling backoff.
pub const DEFAULT_TRANSACT_MAX_BACKOFF_MS: u64 = 1_000;

/// Committed write sets retained for conflict checks in the in-memory store.
///
/// A transaction whose read version predates the oldest retained commit can no
/// longer be checked and fails with `TransactionTooOld`.
pub const MEMORY_STORE_HISTORY_LIMIT: usize = 16_384;

/// Largest key accepted by the in-memory store.
pub const MAX_KEY_SIZE_BYTES: usize = 10_000;

/// Largest value accepted by the in-memory store.
pub const MAX_VALUE_SIZE_BYTES: usize = 100_000;

const _: () = assert!(DEFAULT_TRANSACT_INITIAL_BACKOFF_MS > 0);
const _: () = assert!(DEFAULT_TRANSACT_INITIAL_BACKOFF_MS <= DEFAULT_TRANSACT_MAX_BACKOFF_MS);
const _: () = assert!(MEMORY_STORE_HISTORY_LIMIT > 0);
