//! Contention-tolerant FIFO queue over a transactional store.
//!
//! Items live under `root / "item"` keyed by `(index, random suffix)`. A push
//! takes the index one past the current tail, read at snapshot isolation, so
//! concurrent pushers do not conflict; items pushed concurrently share an index
//! and are ordered among themselves by their random suffix.
//!
//! Pops come in two flavours, picked by [`ContentionMode`]:
//!
//! - `Simple`: read the head item and clear it in one retried transaction. Every
//!   concurrent popper conflicts on the head, so only one wins per round.
//! - `High`: try the simple pop once. If others are already waiting, or the pop
//!   conflicts, register a waiter under `root / "pop"` and run fulfilment
//!   sweeps that pair the oldest waiters with the oldest items, writing each
//!   item into its waiter's result slot under `root / "conflict"`. The waiter
//!   polls its slot with exponential backoff.
//!
//! Ordering is approximately FIFO: exact global order under concurrent pushes
//! is not provided.

mod contention;
mod fast_path;
mod keys;

use std::sync::Arc;

use aspen_layer::Subspace;
use aspen_layer::Tuple;
use aspen_txn::RangeOptions;
use aspen_txn::ReadMode;
use aspen_txn::Transaction;
use tracing::debug;

use crate::config::ContentionMode;
use crate::config::QueueConfig;
use crate::constants::ITEM_NAMESPACE;
use crate::constants::RESULT_NAMESPACE;
use crate::constants::WAITER_NAMESPACE;
use crate::error::QueueError;
use crate::random::OsRandomSource;
use crate::random::RandomId;
use crate::random::RandomSource;

/// A queue rooted at a subspace.
///
/// The handle holds no queue state; everything lives in the store, so any
/// number of handles over the same root, in any number of processes, operate
/// on the same queue.
#[derive(Debug, Clone)]
pub struct Queue {
    root: Subspace,
    items: Subspace,
    waiters: Subspace,
    results: Subspace,
    config: QueueConfig,
    random: Arc<dyn RandomSource>,
}

impl Queue {
    /// Queue under `root` with default tuning.
    pub fn new(root: Subspace, mode: ContentionMode) -> Self {
        Self::with_config(root, QueueConfig::with_mode(mode))
    }

    pub fn with_config(root: Subspace, config: QueueConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "QUEUE: config must be validated before use");

        let items = root.subspace(&Tuple::new().push(ITEM_NAMESPACE));
        let waiters = root.subspace(&Tuple::new().push(WAITER_NAMESPACE));
        let results = root.subspace(&Tuple::new().push(RESULT_NAMESPACE));
        Self {
            root,
            items,
            waiters,
            results,
            config,
            random: Arc::new(OsRandomSource),
        }
    }

    /// Replace the source of item suffixes and waiter ids.
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Remove every item, waiter, and result slot.
    pub fn clear<T>(&self, tx: &mut T)
    where
        T: Transaction + ?Sized,
    {
        let (begin, end) = self.root.range();
        tx.clear_range(&begin, &end);
        debug!("queue cleared");
    }

    /// Whether the queue holds no items.
    ///
    /// Waiters and unclaimed results do not count.
    pub async fn is_empty<T>(&self, tx: &mut T) -> Result<bool, QueueError>
    where
        T: Transaction + ?Sized,
    {
        let options = RangeOptions::from_range(self.items.range()).with_limit(1);
        let first = tx.get_range(options, ReadMode::Serializable).await?;
        Ok(first.is_empty())
    }

    fn next_random_id(&self) -> RandomId {
        self.random.next_id()
    }
}

#[cfg(test)]
mod tests {
    use aspen_txn::InMemoryStore;
    use aspen_txn::TransactionalStore;

    use super::*;

    fn queue() -> Queue {
        Queue::new(Subspace::new(&Tuple::new().push("q")), ContentionMode::Simple)
    }

    #[test]
    fn test_namespaces_nest_under_root() {
        let q = queue();
        for child in [&q.items, &q.waiters, &q.results] {
            assert!(q.root.contains(child.raw_prefix()));
            assert_ne!(child, &q.root);
        }
        assert_ne!(q.items, q.waiters);
        assert_ne!(q.waiters, q.results);
    }

    #[tokio::test]
    async fn test_clear_removes_every_family() {
        let store = InMemoryStore::new();
        let q = queue();

        let mut tx = store.begin().unwrap();
        q.push(&mut tx, b"x").await.unwrap();
        q.register_waiter(&mut tx, true).await.unwrap();
        tx.set(&keys::result_key(&q.results, &[1; 20]), b"");
        tx.commit().await.unwrap();
        assert_eq!(store.len(), 3);

        let mut tx = store.begin().unwrap();
        q.clear(&mut tx);
        tx.commit().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear_leaves_siblings_alone() {
        let store = InMemoryStore::new();
        let a = Queue::new(Subspace::new(&Tuple::new().push("a")), ContentionMode::Simple);
        let b = Queue::new(Subspace::new(&Tuple::new().push("b")), ContentionMode::Simple);

        let mut tx = store.begin().unwrap();
        a.push(&mut tx, b"1").await.unwrap();
        b.push(&mut tx, b"2").await.unwrap();
        a.clear(&mut tx);
        tx.commit().await.unwrap();

        let mut tx = store.begin().unwrap();
        assert!(a.is_empty(&mut tx).await.unwrap());
        assert_eq!(b.peek(&mut tx).await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_waiters_do_not_make_queue_non_empty() {
        let store = InMemoryStore::new();
        let q = queue();

        let mut tx = store.begin().unwrap();
        q.register_waiter(&mut tx, true).await.unwrap();
        assert!(q.is_empty(&mut tx).await.unwrap());
    }
}
