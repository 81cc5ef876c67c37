//! Queue and event log constants.
//!
//! Defaults here seed [`QueueConfig`](crate::QueueConfig); the compile-time
//! assertions at the bottom keep them mutually consistent.

/// Length of the random suffixes on item keys and of waiter ids.
pub const RANDOM_ID_LEN: usize = 20;

/// Sub-namespace holding queued items.
pub const ITEM_NAMESPACE: &str = "item";

/// Sub-namespace holding registered waiters (conflicted pops).
pub const WAITER_NAMESPACE: &str = "pop";

/// Sub-namespace holding fulfilled results (conflicted items).
pub const RESULT_NAMESPACE: &str = "conflict";

/// Waiters and items read per fulfilment sweep.
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = 100;

/// Upper bound on `sweep_batch_size`.
pub const MAX_SWEEP_BATCH_SIZE: usize = 10_000;

/// First delay while a waiter polls for its result.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 10;

/// Ceiling for the waiter's doubling poll delay.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 1_000;

/// Sweep commits a waiter tries per polling round before backing off.
pub const SWEEP_ATTEMPTS_PER_ROUND: u32 = 3;

/// Sub-namespace holding event log records.
pub const EVENT_LOG_NAMESPACE: &str = "glob";

/// Records accepted by a single `EventLog::append`.
pub const MAX_EVENT_BATCH_SIZE: usize = 1_000;

const _: () = assert!(DEFAULT_SWEEP_BATCH_SIZE > 0);
const _: () = assert!(DEFAULT_SWEEP_BATCH_SIZE <= MAX_SWEEP_BATCH_SIZE);
const _: () = assert!(DEFAULT_INITIAL_BACKOFF_MS > 0);
const _: () = assert!(DEFAULT_INITIAL_BACKOFF_MS <= DEFAULT_MAX_BACKOFF_MS);
const _: () = assert!(SWEEP_ATTEMPTS_PER_ROUND > 0);
const _: () = assert!(RANDOM_ID_LEN > 0);
