//! Store error taxonomy.

use snafu::Snafu;

/// Errors surfaced by a transactional store.
///
/// The store's numeric error codes are kept for `NotCommitted` and
/// `TransactionTooOld` so logs line up with store-side diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum TransactionError {
    /// Commit rejected: a concurrently committed transaction wrote inside this transaction's
    /// read-conflict ranges.
    #[snafu(display("transaction not committed due to conflict with another transaction (1020)"))]
    NotCommitted,

    /// The transaction's read version is too old to be checked for conflicts.
    #[snafu(display("transaction is too old to perform reads or be committed (1007)"))]
    TransactionTooOld,

    /// A key or value was rejected by the store.
    #[snafu(display("invalid mutation: {reason}"))]
    InvalidMutation {
        /// What was wrong with it.
        reason: String,
    },

    /// The store could not be reached.
    #[snafu(display("store unavailable: {reason}"))]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },

    /// Any other store-side failure.
    #[snafu(display("store operation failed: {reason}"))]
    Failed {
        /// Description of the failure.
        reason: String,
    },

    /// [`transact`](crate::transact) gave up after repeated conflict-class failures.
    #[snafu(display("transaction retry limit reached after {attempts} attempts"))]
    RetryLimitExceeded {
        /// Attempts made, including the first.
        attempts: u32,
    },
}

impl TransactionError {
    /// Store error code, where the store defines one.
    pub fn code(&self) -> Option<u16> {
        match self {
            TransactionError::NotCommitted => Some(1020),
            TransactionError::TransactionTooOld => Some(1007),
            _ => None,
        }
    }
}

/// Classifies an error as conflict-class (rerun the step) or fatal.
pub trait Retryable {
    /// True if rerunning the same step in a fresh transaction may succeed.
    fn is_retryable(&self) -> bool;
}

impl Retryable for TransactionError {
    fn is_retryable(&self) -> bool {
        matches!(self, TransactionError::NotCommitted | TransactionError::TransactionTooOld)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_errors_are_retryable() {
        assert!(TransactionError::NotCommitted.is_retryable());
        assert!(TransactionError::TransactionTooOld.is_retryable());
    }

    #[test]
    fn test_fatal_errors_are_not_retryable() {
        let fatal = [
            TransactionError::Unavailable {
                reason: "connection refused".into(),
            },
            TransactionError::Failed { reason: "disk".into() },
            TransactionError::InvalidMutation { reason: "key".into() },
            TransactionError::RetryLimitExceeded { attempts: 3 },
        ];
        for err in fatal {
            assert!(!err.is_retryable(), "{err} should be fatal");
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TransactionError::NotCommitted.code(), Some(1020));
        assert_eq!(TransactionError::TransactionTooOld.code(), Some(1007));
        assert_eq!(TransactionError::Failed { reason: "x".into() }.code(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TransactionError::RetryLimitExceeded { attempts: 7 }.to_string(),
            "transaction retry limit reached after 7 attempts"
        );
    }
}
