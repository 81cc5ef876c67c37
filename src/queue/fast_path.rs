//! Index assignment, push, peek, and the conflict-prone simple pop.

use aspen_layer::Subspace;
use aspen_txn::KeySelector;
use aspen_txn::KeyValue;
use aspen_txn::RangeOptions;
use aspen_txn::ReadMode;
use aspen_txn::Transaction;
use aspen_txn::TransactionalStore;
use aspen_txn::transact;
use tracing::debug;
use tracing::trace;

use super::Queue;
use super::keys;
use crate::config::ContentionMode;
use crate::error::QueueError;
use crate::error::printable;

impl Queue {
    /// One past the leading index of the last key in `space`, or 0 if `space` is empty.
    ///
    /// The tail is read at snapshot isolation so concurrent callers do not
    /// conflict on it; they may receive the same index.
    pub async fn next_index<T>(tx: &mut T, space: &Subspace) -> Result<i64, QueueError>
    where
        T: Transaction + ?Sized,
    {
        let (begin, end) = space.range();
        let last = tx.get_key(KeySelector::last_less_than(end), ReadMode::Snapshot).await?;

        match last {
            Some(key) if key >= begin => {
                let index = keys::decode_index(space, &key)?;
                index.checked_add(1).ok_or_else(|| QueueError::CorruptedKey {
                    key: printable(&key),
                    reason: "index is already at i64::MAX".into(),
                })
            }
            _ => Ok(0),
        }
    }

    /// Index the next pushed item will take.
    pub async fn next_queue_index<T>(&self, tx: &mut T) -> Result<i64, QueueError>
    where
        T: Transaction + ?Sized,
    {
        Self::next_index(tx, &self.items).await
    }

    /// Append `payload` as part of `tx`.
    ///
    /// Composes with other operations in the same transaction.
    pub async fn push<T>(&self, tx: &mut T, payload: &[u8]) -> Result<(), QueueError>
    where
        T: Transaction + ?Sized,
    {
        let index = self.next_queue_index(tx).await?;
        let key = keys::indexed_key(&self.items, index, &self.next_random_id());
        tx.set(&key, &keys::encode_value(payload));
        trace!(index, payload_len = payload.len(), "item pushed");
        Ok(())
    }

    /// Payload of the head item without removing it.
    pub async fn peek<T>(&self, tx: &mut T) -> Result<Option<Vec<u8>>, QueueError>
    where
        T: Transaction + ?Sized,
    {
        match self.first_item(tx).await? {
            Some(item) => keys::decode_value(&item.key, &item.value).map(Some),
            None => Ok(None),
        }
    }

    /// Remove and return the head item as part of `tx`.
    ///
    /// Every concurrent caller reads the same head, so all but one of their
    /// commits conflict.
    pub async fn pop_simple<T>(&self, tx: &mut T) -> Result<Option<Vec<u8>>, QueueError>
    where
        T: Transaction + ?Sized,
    {
        match self.first_item(tx).await? {
            Some(item) => {
                let payload = keys::decode_value(&item.key, &item.value)?;
                tx.clear(&item.key);
                Ok(Some(payload))
            }
            None => Ok(None),
        }
    }

    /// Remove and return the head item in its own transaction(s).
    ///
    /// Cannot be composed with other work in a caller transaction. Returns
    /// `None` when the queue is empty.
    pub async fn pop<S>(&self, store: &S) -> Result<Option<Vec<u8>>, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        match self.config.contention_mode {
            ContentionMode::Simple => self.pop_retried(store).await,
            ContentionMode::High => self.pop_high_contention(store).await,
        }
    }

    async fn pop_retried<S>(&self, store: &S) -> Result<Option<Vec<u8>>, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        let popped = transact(store, &self.config.retry_policy(), |mut tx| async move {
            let result = self.pop_simple(&mut tx).await;
            (tx, result)
        })
        .await?;
        debug!(found = popped.is_some(), "simple pop finished");
        Ok(popped)
    }

    pub(super) async fn first_item<T>(&self, tx: &mut T) -> Result<Option<KeyValue>, QueueError>
    where
        T: Transaction + ?Sized,
    {
        let options = RangeOptions::from_range(self.items.range()).with_limit(1);
        Ok(tx.get_range(options, ReadMode::Serializable).await?.into_iter().next())
    }
}
