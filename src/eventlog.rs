//! Append-only event log.
//!
//! Each `append` draws a fresh random shard id and writes its whole batch
//! under it:
//!
//! ```text
//! root / "glob" / shard / (unix_secs, seq, contract) / "data" -> data
//! root / "glob" / shard / (unix_secs, seq, contract) / "meta" -> meta
//! ```
//!
//! Concurrent appenders therefore never write overlapping keys and never
//! conflict. Order is preserved within a batch; across batches it is not.

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use aspen_layer::Subspace;
use aspen_layer::Tuple;
use aspen_txn::RangeOptions;
use aspen_txn::ReadMode;
use aspen_txn::RetryPolicy;
use aspen_txn::Transaction;
use aspen_txn::TransactionalStore;
use aspen_txn::transact;
use snafu::ResultExt;
use tracing::debug;

use crate::constants::EVENT_LOG_NAMESPACE;
use crate::constants::MAX_EVENT_BATCH_SIZE;
use crate::error::KeyDecodeSnafu;
use crate::error::QueueError;
use crate::error::printable;
use crate::random::OsRandomSource;
use crate::random::RandomId;
use crate::random::RandomSource;

const DATA_FIELD: &str = "data";
const META_FIELD: &str = "meta";

/// One event as supplied by the appender.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventRecord {
    /// Name of the contract (event type) the record belongs to.
    pub contract: String,
    pub data: Vec<u8>,
    pub meta: Vec<u8>,
}

/// An event read back from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// Shard of the batch the event was appended in.
    pub shard: RandomId,
    /// Wall-clock second of the append.
    pub unix_secs: i64,
    /// Position within its batch.
    pub seq: i64,
    pub record: EventRecord,
}

/// Sharded append-only log under a root subspace.
#[derive(Debug, Clone)]
pub struct EventLog {
    root: Subspace,
    shards: Subspace,
    policy: RetryPolicy,
    random: Arc<dyn RandomSource>,
}

impl EventLog {
    pub fn new(root: Subspace) -> Self {
        let shards = root.subspace(&Tuple::new().push(EVENT_LOG_NAMESPACE));
        Self {
            root,
            shards,
            policy: RetryPolicy::default(),
            random: Arc::new(OsRandomSource),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Write `records` in one retried transaction under a new shard.
    ///
    /// Returns the shard id.
    pub async fn append<S>(&self, store: &S, records: &[EventRecord]) -> Result<RandomId, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        if records.len() > MAX_EVENT_BATCH_SIZE {
            return Err(QueueError::InvalidBatch {
                reason: format!("{} records exceeds the limit of {MAX_EVENT_BATCH_SIZE}", records.len()),
            });
        }

        let shard = self.random.next_id();
        let shard_space = self.shards.subspace(&Tuple::new().push(shard.as_slice()));
        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or_default();

        let shard_space = &shard_space;
        transact(store, &self.policy, |mut tx| async move {
            for (seq, record) in records.iter().enumerate() {
                let event = shard_space.subspace(
                    &Tuple::new().push(unix_secs).push(seq as i64).push(record.contract.as_str()),
                );
                tx.set(&event.pack(&Tuple::new().push(DATA_FIELD)), &record.data);
                tx.set(&event.pack(&Tuple::new().push(META_FIELD)), &record.meta);
            }
            (tx, Ok::<_, QueueError>(()))
        })
        .await?;

        debug!(shard = %printable(&shard), count = records.len(), unix_secs, "events appended");
        Ok(shard)
    }

    /// Read up to `limit` events (0 for all) in key order.
    pub async fn read_all<T>(&self, tx: &mut T, limit: usize) -> Result<Vec<StoredEvent>, QueueError>
    where
        T: Transaction + ?Sized,
    {
        let key_limit = limit.saturating_mul(2);
        let pairs = tx
            .get_range(RangeOptions::from_range(self.shards.range()).with_limit(key_limit), ReadMode::Serializable)
            .await?;

        let mut events: Vec<StoredEvent> = Vec::new();
        for pair in pairs {
            let (event, field) = self.decode_key(&pair.key)?;
            let continues_last = matches!(
                events.last(),
                Some(last) if last.shard == event.shard && last.unix_secs == event.unix_secs && last.seq == event.seq
            );
            if !continues_last {
                events.push(event);
            }
            let last = events.len() - 1;
            let record = &mut events[last].record;
            match field.as_str() {
                DATA_FIELD => record.data = pair.value,
                META_FIELD => record.meta = pair.value,
                _ => {
                    return Err(QueueError::CorruptedKey {
                        key: printable(&pair.key),
                        reason: format!("unknown event field '{field}'"),
                    });
                }
            }
        }
        if limit > 0 {
            events.truncate(limit);
        }
        Ok(events)
    }

    /// Remove every event in one retried transaction.
    pub async fn clear<S>(&self, store: &S) -> Result<(), QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        let (begin, end) = self.root.range();
        let range = (&begin, &end);
        transact(store, &self.policy, |mut tx| async move {
            tx.clear_range(range.0, range.1);
            (tx, Ok::<_, QueueError>(()))
        })
        .await?;
        debug!("event log cleared");
        Ok(())
    }

    /// Split a log key into its event coordinates and field name.
    fn decode_key(&self, key: &[u8]) -> Result<(StoredEvent, String), QueueError> {
        let tuple = self.shards.unpack(key).context(KeyDecodeSnafu { key: printable(key) })?;
        let corrupted = || QueueError::CorruptedKey {
            key: printable(key),
            reason: "expected (shard, unix_secs, seq, contract, field)".into(),
        };

        if tuple.len() != 5 {
            return Err(corrupted());
        }
        let shard = tuple.get_bytes(0).and_then(|b| RandomId::try_from(b).ok()).ok_or_else(corrupted)?;
        let unix_secs = tuple.get_int(1).ok_or_else(corrupted)?;
        let seq = tuple.get_int(2).ok_or_else(corrupted)?;
        let contract = tuple.get(3).and_then(|e| e.as_str()).ok_or_else(corrupted)?;
        let field = tuple.get(4).and_then(|e| e.as_str()).ok_or_else(corrupted)?;

        Ok((
            StoredEvent {
                shard,
                unix_secs,
                seq,
                record: EventRecord {
                    contract: contract.to_string(),
                    ..EventRecord::default()
                },
            },
            field.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use aspen_txn::InMemoryStore;

    use super::*;
    use crate::random::SeededRandomSource;

    fn log() -> EventLog {
        EventLog::new(Subspace::new(&Tuple::new().push("events")))
            .with_random_source(Arc::new(SeededRandomSource::new(3)))
    }

    fn record(contract: &str, data: &[u8]) -> EventRecord {
        EventRecord {
            contract: contract.to_string(),
            data: data.to_vec(),
            meta: format!("meta-{contract}").into_bytes(),
        }
    }

    #[tokio::test]
    async fn test_batch_roundtrip_keeps_order() {
        let store = InMemoryStore::new();
        let log = log();
        let batch = vec![record("order.created", b"1"), record("order.paid", b"2"), record("order.created", b"3")];

        let shard = log.append(&store, &batch).await.unwrap();

        let mut tx = store.begin().unwrap();
        let events = log.read_all(&mut tx, 0).await.unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.shard == shard));
        let records: Vec<EventRecord> = events.into_iter().map(|e| e.record).collect();
        assert_eq!(records, batch);
    }

    #[tokio::test]
    async fn test_batches_land_in_separate_shards() {
        let store = InMemoryStore::new();
        let log = log();

        let a = log.append(&store, &[record("a", b"x")]).await.unwrap();
        let b = log.append(&store, &[record("b", b"y")]).await.unwrap();
        assert_ne!(a, b);

        let mut tx = store.begin().unwrap();
        let events = log.read_all(&mut tx, 0).await.unwrap();
        let mut contracts: Vec<&str> = events.iter().map(|e| e.record.contract.as_str()).collect();
        contracts.sort();
        assert_eq!(contracts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_read_limit_counts_events() {
        let store = InMemoryStore::new();
        let log = log();
        log.append(&store, &[record("a", b"1"), record("b", b"2"), record("c", b"3")]).await.unwrap();

        let mut tx = store.begin().unwrap();
        let events = log.read_all(&mut tx, 2).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].record.meta, b"meta-b".to_vec());
    }

    #[tokio::test]
    async fn test_clear_empties_log() {
        let store = InMemoryStore::new();
        let log = log();
        log.append(&store, &[record("a", b"1")]).await.unwrap();

        log.clear(&store).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected() {
        let store = InMemoryStore::new();
        let batch = vec![EventRecord::default(); MAX_EVENT_BATCH_SIZE + 1];
        assert!(matches!(log().append(&store, &batch).await, Err(QueueError::InvalidBatch { .. })));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_field_is_corrupted() {
        let store = InMemoryStore::new();
        let log = log();
        let key = log.shards.pack(&Tuple::new().push([7u8; 20]).push(0i64).push(0i64).push("c").push("extra"));

        let mut tx = store.begin().unwrap();
        tx.set(&key, b"");
        assert!(matches!(log.read_all(&mut tx, 0).await, Err(QueueError::CorruptedKey { .. })));
    }
}
