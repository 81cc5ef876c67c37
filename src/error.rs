//! Error types for the queue and event log layers.

use aspen_layer::SubspaceError;
use aspen_layer::TupleError;
use aspen_txn::Retryable;
use aspen_txn::TransactionError;
use snafu::Snafu;

/// Errors from queue and event log operations.
///
/// An empty queue is `Ok(None)`, never an error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QueueError {
    /// A stored value is not a valid packed tuple.
    #[snafu(display("failed to decode value at key '{key}': {source}"))]
    Codec {
        /// The key holding the value.
        key: String,
        /// The underlying codec error.
        source: TupleError,
    },

    /// A key in a queue namespace could not be decoded.
    #[snafu(display("corrupted key '{key}': {source}"))]
    KeyDecode {
        /// The offending key.
        key: String,
        /// The underlying error.
        source: SubspaceError,
    },

    /// A key decoded, but not to the expected shape.
    #[snafu(display("corrupted key '{key}': {reason}"))]
    CorruptedKey {
        /// The offending key.
        key: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// A value decoded, but not to the expected shape.
    #[snafu(display("corrupted value at key '{key}': {reason}"))]
    CorruptedValue {
        /// The key holding the value.
        key: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// Underlying store error.
    #[snafu(display("store error: {source}"))]
    Store {
        /// The underlying error.
        source: TransactionError,
    },

    /// A retried transaction kept conflicting past the configured `max_transaction_retries`.
    #[snafu(display("max retries exceeded: {attempts} attempts"))]
    MaxRetriesExceeded {
        /// Number of attempts made.
        attempts: u32,
    },

    /// A high-contention pop waited past its configured deadline.
    #[snafu(display("pop not fulfilled within {waited_ms}ms"))]
    WaitTimeout {
        /// How long the pop waited.
        waited_ms: u64,
    },

    /// Invalid event log input.
    #[snafu(display("invalid event batch: {reason}"))]
    InvalidBatch {
        /// Description of what went wrong.
        reason: String,
    },
}

impl From<TransactionError> for QueueError {
    fn from(source: TransactionError) -> Self {
        match source {
            TransactionError::RetryLimitExceeded { attempts } => QueueError::MaxRetriesExceeded { attempts },
            source => QueueError::Store { source },
        }
    }
}

impl Retryable for QueueError {
    fn is_retryable(&self) -> bool {
        match self {
            QueueError::Store { source } => source.is_retryable(),
            _ => false,
        }
    }
}

impl QueueError {
    /// True for a commit rejected by a concurrent transaction.
    pub fn is_conflict(&self) -> bool {
        self.is_retryable()
    }
}

/// Printable form of a raw key for error messages and logs.
pub(crate) fn printable(key: &[u8]) -> String {
    key.escape_ascii().to_string()
}

/// Configuration errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[snafu(display("invalid configuration for {key}: '{value}' ({reason})"))]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The TOML document could not be parsed.
    #[snafu(display("failed to parse queue configuration: {source}"))]
    Parse {
        /// The underlying parser error.
        source: toml::de::Error,
    },
}
