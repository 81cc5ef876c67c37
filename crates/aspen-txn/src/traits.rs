//! The store contract consumed by layers.

use async_trait::async_trait;

use crate::error::TransactionError;
use crate::selector::KeySelector;
use crate::selector::KeyValue;
use crate::selector::RangeOptions;
use crate::selector::ReadMode;

/// A unit of atomic work against an ordered transactional store.
///
/// Writes are buffered locally and become visible to other transactions only
/// when [`commit`](Self::commit) succeeds. Reads observe the transaction's own
/// buffered writes.
#[async_trait]
pub trait Transaction: Send {
    /// Read a single key.
    async fn get(&mut self, key: &[u8], mode: ReadMode) -> Result<Option<Vec<u8>>, TransactionError>;

    /// Resolve a positional selector to an existing key without reading its value.
    ///
    /// Returns `None` when no key satisfies the selector.
    async fn get_key(&mut self, selector: KeySelector, mode: ReadMode) -> Result<Option<Vec<u8>>, TransactionError>;

    /// Read key-value pairs in `[options.begin, options.end)` in key order.
    async fn get_range(&mut self, options: RangeOptions, mode: ReadMode) -> Result<Vec<KeyValue>, TransactionError>;

    /// Buffer a write of `value` at `key`.
    fn set(&mut self, key: &[u8], value: &[u8]);

    /// Buffer removal of `key`.
    fn clear(&mut self, key: &[u8]);

    /// Buffer removal of every key in `[begin, end)`.
    fn clear_range(&mut self, begin: &[u8], end: &[u8]);

    /// Make the commit conflict if another transaction writes `key` after this
    /// transaction's read version, without reading it.
    fn add_read_conflict_key(&mut self, key: &[u8]);

    /// Atomically apply buffered writes.
    ///
    /// Fails with a retryable error (see [`Retryable`](crate::Retryable)) when
    /// a concurrent commit invalidated this transaction's reads. A transaction
    /// with no writes always commits.
    async fn commit(&mut self) -> Result<(), TransactionError>;

    /// Discard buffered writes and conflict ranges and start over with a fresh read version.
    fn reset(&mut self);
}

/// Source of transactions.
pub trait TransactionalStore: Send + Sync {
    type Transaction: Transaction + 'static;

    /// Open a new transaction.
    fn begin(&self) -> Result<Self::Transaction, TransactionError>;
}

impl<S: TransactionalStore + ?Sized> TransactionalStore for std::sync::Arc<S> {
    type Transaction = S::Transaction;

    fn begin(&self) -> Result<Self::Transaction, TransactionError> {
        (**self).begin()
    }
}
