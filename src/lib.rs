//! Queue and event log layers for ordered transactional key-value stores.
//!
//! The layers keep all of their state in the store and coordinate only
//! through optimistic transactions, so any number of clients can share them.
//!
//! - [`Queue`]: approximately-FIFO queue. Pushes avoid a hot counter key by
//!   deriving the next index from the current tail at snapshot isolation. In
//!   [`ContentionMode::High`] pops that collide register as waiters and are
//!   served in registration order by fulfilment sweeps.
//! - [`EventLog`]: append-only log whose batches are spread over random shards
//!   so concurrent appenders never conflict.
//!
//! Both are written against the [`aspen_txn`] store contract and run on any
//! [`TransactionalStore`](aspen_txn::TransactionalStore), including the
//! in-process [`InMemoryStore`](aspen_txn::InMemoryStore).
//!
//! # Example
//!
//! ```
//! use aspen_layer::Subspace;
//! use aspen_layer::Tuple;
//! use aspen_queue::ContentionMode;
//! use aspen_queue::Queue;
//! use aspen_txn::InMemoryStore;
//! use aspen_txn::Transaction;
//! use aspen_txn::TransactionalStore;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let store = InMemoryStore::new();
//! let queue = Queue::new(Subspace::new(&Tuple::new().push("jobs")), ContentionMode::High);
//!
//! let mut tx = store.begin().unwrap();
//! queue.push(&mut tx, b"build #1").await.unwrap();
//! queue.push(&mut tx, b"build #2").await.unwrap();
//! tx.commit().await.unwrap();
//!
//! assert_eq!(queue.pop(&store).await.unwrap(), Some(b"build #1".to_vec()));
//! assert_eq!(queue.pop(&store).await.unwrap(), Some(b"build #2".to_vec()));
//! assert_eq!(queue.pop(&store).await.unwrap(), None);
//! # });
//! ```

mod config;
pub mod constants;
mod error;
mod eventlog;
mod queue;
mod random;

pub use config::ContentionMode;
pub use config::QueueConfig;
pub use error::ConfigError;
pub use error::QueueError;
pub use eventlog::EventLog;
pub use eventlog::EventRecord;
pub use eventlog::StoredEvent;
pub use queue::Queue;
pub use random::OsRandomSource;
pub use random::RandomId;
pub use random::RandomSource;
pub use random::SeededRandomSource;
