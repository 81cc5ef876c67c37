//! Transaction adapter for ordered, transactional key-value stores.
//!
//! Layers such as queues and logs are written against two traits:
//!
//! - [`TransactionalStore`]: hands out fresh transactions.
//! - [`Transaction`]: point reads, key selectors, range reads, buffered writes, and an optimistic
//!   `commit` that fails with a conflict-class error when a concurrently committed transaction
//!   invalidated what was read.
//!
//! Reads take a [`ReadMode`]. `Serializable` reads register read-conflict ranges; `Snapshot` reads
//! do not, which lets callers peek at hot ranges (for example the tail of a queue) without
//! conflicting with every writer.
//!
//! [`transact`] runs a body with retry on conflict-class errors, and [`InMemoryStore`] implements
//! the contract in process with serializable conflict detection.
//!
//! ```
//! use aspen_txn::InMemoryStore;
//! use aspen_txn::ReadMode;
//! use aspen_txn::Transaction;
//! use aspen_txn::TransactionalStore;
//!
//! # tokio_test_block_on(async {
//! let store = InMemoryStore::new();
//! let mut tx = store.begin().unwrap();
//! tx.set(b"k", b"v");
//! tx.commit().await.unwrap();
//!
//! let mut tx = store.begin().unwrap();
//! assert_eq!(tx.get(b"k", ReadMode::Serializable).await.unwrap(), Some(b"v".to_vec()));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod constants;
mod error;
mod memory;
mod selector;
mod traits;
mod transact;

pub use constants::DEFAULT_TRANSACT_INITIAL_BACKOFF_MS;
pub use constants::DEFAULT_TRANSACT_MAX_BACKOFF_MS;
pub use constants::KEYSPACE_END;
pub use error::Retryable;
pub use error::TransactionError;
pub use memory::InMemoryStore;
pub use memory::InMemoryTransaction;
pub use selector::KeySelector;
pub use selector::KeyValue;
pub use selector::RangeOptions;
pub use selector::ReadMode;
pub use traits::Transaction;
pub use traits::TransactionalStore;
pub use transact::RetryPolicy;
pub use transact::transact;
