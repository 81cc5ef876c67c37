//! In-process optimistic transactional store.
//!
//! Data lives in a `BTreeMap` behind a `parking_lot::Mutex`, with every key
//! holding the versions it was written at. Every commit with writes gets the
//! next version and records the key ranges it wrote. Reads observe the store
//! as of the transaction's read version, overlaid with its own buffered
//! writes, so a transaction never sees part of a concurrent commit. A
//! committing transaction is checked against the write ranges of every commit
//! newer than its read version; any overlap with its read-conflict ranges
//! rejects it with `NotCommitted`.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use tracing::trace;

use crate::constants::KEYSPACE_END;
use crate::constants::MAX_KEY_SIZE_BYTES;
use crate::constants::MAX_VALUE_SIZE_BYTES;
use crate::constants::MEMORY_STORE_HISTORY_LIMIT;
use crate::error::TransactionError;
use crate::selector::KeySelector;
use crate::selector::KeyValue;
use crate::selector::RangeOptions;
use crate::selector::ReadMode;
use crate::traits::Transaction;
use crate::traits::TransactionalStore;

/// Half-open key range `[begin, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyRange {
    begin: Vec<u8>,
    end: Vec<u8>,
}

impl KeyRange {
    fn new(begin: &[u8], end: &[u8]) -> Self {
        Self {
            begin: begin.to_vec(),
            end: end.to_vec(),
        }
    }

    /// The range holding exactly `key`.
    fn single(key: &[u8]) -> Self {
        Self {
            begin: key.to_vec(),
            end: key_after(key),
        }
    }

    fn intersects(&self, other: &KeyRange) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.begin.as_slice() <= key && key < self.end.as_slice()
    }

    fn is_empty(&self) -> bool {
        self.begin >= self.end
    }
}

/// Smallest key strictly greater than `key`.
fn key_after(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0x00);
    next
}

/// A buffered write.
#[derive(Debug, Clone)]
enum Mutation {
    Set { key: Vec<u8>, value: Vec<u8> },
    Clear { key: Vec<u8> },
    ClearRange { range: KeyRange },
}

impl Mutation {
    fn write_range(&self) -> KeyRange {
        match self {
            Mutation::Set { key, .. } | Mutation::Clear { key } => KeyRange::single(key),
            Mutation::ClearRange { range } => range.clone(),
        }
    }

    /// Effect on `key`: `Some(Some(v))` set, `Some(None)` removed, `None` untouched.
    fn effect_on(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        match self {
            Mutation::Set { key: k, value } if k.as_slice() == key => Some(Some(value.as_slice())),
            Mutation::Clear { key: k } if k.as_slice() == key => Some(None),
            Mutation::ClearRange { range } if range.contains(key) => Some(None),
            _ => None,
        }
    }
}

/// Committed versions of one key, oldest first. `None` records a clear.
type Versions = Vec<(u64, Option<Vec<u8>>)>;

/// Value visible at `version`.
fn value_at(versions: &Versions, version: u64) -> Option<&[u8]> {
    versions.iter().rev().find(|(v, _)| *v <= version).and_then(|(_, value)| value.as_deref())
}

fn latest(versions: &Versions) -> Option<&[u8]> {
    versions.last().and_then(|(_, value)| value.as_deref())
}

/// Write ranges of one committed transaction.
#[derive(Debug)]
struct CommitRecord {
    version: u64,
    ranges: Vec<KeyRange>,
}

#[derive(Debug, Default)]
struct StoreState {
    data: BTreeMap<Vec<u8>, Versions>,
    /// Version of the latest commit.
    version: u64,
    /// Newest commits last.
    history: VecDeque<CommitRecord>,
    /// Read versions below this can no longer be read at or conflict-checked.
    oldest_checkable_version: u64,
    /// Errors returned, in order, by the next commits that carry writes.
    injected_failures: VecDeque<TransactionError>,
}

impl StoreState {
    fn conflicts_with(&self, read_version: u64, read_ranges: &[KeyRange]) -> bool {
        self.history
            .iter()
            .rev()
            .take_while(|record| record.version > read_version)
            .any(|record| record.ranges.iter().any(|w| read_ranges.iter().any(|r| r.intersects(w))))
    }

    fn check_readable(&self, read_version: u64) -> Result<(), TransactionError> {
        if read_version < self.oldest_checkable_version {
            return Err(TransactionError::TransactionTooOld);
        }
        Ok(())
    }

    /// Live keys in `range`, latest state.
    fn live_keys(&self, range: &KeyRange) -> Vec<Vec<u8>> {
        self.data
            .range::<[u8], _>((Bound::Included(range.begin.as_slice()), Bound::Excluded(range.end.as_slice())))
            .filter(|(_, versions)| latest(versions).is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn write(&mut self, key: &[u8], value: Option<Vec<u8>>, version: u64) {
        if value.is_none() && self.data.get(key).and_then(latest).is_none() {
            return;
        }
        let versions = self.data.entry(key.to_vec()).or_default();
        match versions.last_mut() {
            Some((v, slot)) if *v == version => *slot = value,
            _ => versions.push((version, value)),
        }
    }

    fn apply(&mut self, mutations: &[Mutation], version: u64) {
        for mutation in mutations {
            match mutation {
                Mutation::Set { key, value } => self.write(key, Some(value.clone()), version),
                Mutation::Clear { key } => self.write(key, None, version),
                Mutation::ClearRange { range } => {
                    for key in self.live_keys(range) {
                        self.write(&key, None, version);
                    }
                }
            }
        }
    }

    fn record_commit(&mut self, ranges: Vec<KeyRange>) -> u64 {
        self.version += 1;
        self.history.push_back(CommitRecord {
            version: self.version,
            ranges,
        });
        while self.history.len() > MEMORY_STORE_HISTORY_LIMIT {
            if let Some(dropped) = self.history.pop_front() {
                self.oldest_checkable_version = dropped.version;
            }
        }
        if self.version % MEMORY_STORE_HISTORY_LIMIT as u64 == 0 {
            self.prune();
        }
        self.version
    }

    /// Drop versions no readable transaction can observe.
    fn prune(&mut self) {
        let horizon = self.oldest_checkable_version;
        self.data.retain(|_, versions| {
            if let Some(base) = versions.iter().rposition(|(v, _)| *v <= horizon) {
                versions.drain(..base);
            }
            !matches!(versions.as_slice(), [(v, None)] if *v <= horizon)
        });
    }
}

/// In-memory implementation of [`TransactionalStore`].
///
/// Clones share the same underlying data. Intended for tests and
/// single-process use; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<SyncMutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit that carries writes fail with `error` without applying anything.
    ///
    /// Calls queue up; each failing commit consumes one entry.
    pub fn inject_commit_failure(&self, error: TransactionError) {
        self.state.lock().injected_failures.push_back(error);
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.state.lock().data.values().filter(|versions| latest(versions).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Committed pairs in `[begin, end)`, outside any transaction.
    pub fn dump_range(&self, begin: &[u8], end: &[u8]) -> Vec<KeyValue> {
        self.state
            .lock()
            .data
            .range::<[u8], _>((Bound::Included(begin), Bound::Excluded(end)))
            .filter_map(|(key, versions)| {
                latest(versions).map(|value| KeyValue {
                    key: key.clone(),
                    value: value.to_vec(),
                })
            })
            .collect()
    }
}

impl TransactionalStore for InMemoryStore {
    type Transaction = InMemoryTransaction;

    fn begin(&self) -> Result<Self::Transaction, TransactionError> {
        Ok(InMemoryTransaction {
            read_version: self.state.lock().version,
            state: Arc::clone(&self.state),
            mutations: Vec::new(),
            read_conflicts: Vec::new(),
        })
    }
}

/// Transaction over an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    state: Arc<SyncMutex<StoreState>>,
    /// Reads see the store as of this version; newer commits are
    /// conflict-checked against our reads.
    read_version: u64,
    mutations: Vec<Mutation>,
    read_conflicts: Vec<KeyRange>,
}

impl InMemoryTransaction {
    /// Effect of this transaction's own writes on `key`, latest first.
    fn buffered(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        self.mutations.iter().rev().find_map(|m| m.effect_on(key))
    }

    fn add_conflict(&mut self, mode: ReadMode, range: KeyRange) {
        if mode == ReadMode::Serializable && !range.is_empty() {
            self.read_conflicts.push(range);
        }
    }

    /// Range read at the read version overlaid with buffered writes.
    ///
    /// Returns the pairs and the conflict range the read depends on.
    fn scan(&self, options: &RangeOptions) -> Result<(Vec<KeyValue>, KeyRange), TransactionError> {
        let end = if options.end.as_slice() > KEYSPACE_END {
            KEYSPACE_END
        } else {
            options.end.as_slice()
        };
        let requested = KeyRange::new(&options.begin, end);
        if requested.is_empty() {
            return Ok((Vec::new(), requested));
        }
        let limit = if options.limit == 0 { usize::MAX } else { options.limit };

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        {
            let state = self.state.lock();
            state.check_readable(self.read_version)?;
            let bounds = (Bound::Included(requested.begin.as_slice()), Bound::Excluded(requested.end.as_slice()));
            let committed = state.data.range::<[u8], _>(bounds);
            let visible = |(k, versions): (&Vec<u8>, &Versions)| match self.buffered(k) {
                Some(Some(buffered)) => Some((k.clone(), buffered.to_vec())),
                Some(None) => None,
                None => value_at(versions, self.read_version).map(|v| (k.clone(), v.to_vec())),
            };
            if options.reverse {
                merged.extend(committed.rev().filter_map(visible).take(limit));
            } else {
                merged.extend(committed.filter_map(visible).take(limit));
            }
        }

        for mutation in &self.mutations {
            if let Mutation::Set { key, .. } = mutation
                && requested.contains(key)
                && let Some(Some(value)) = self.buffered(key)
            {
                merged.insert(key.clone(), value.to_vec());
            }
        }

        let mut pairs: Vec<KeyValue> = merged.into_iter().map(|(key, value)| KeyValue { key, value }).collect();
        if options.reverse {
            pairs.reverse();
        }
        pairs.truncate(limit);

        let conflict = match pairs.last() {
            Some(last) if pairs.len() == limit => {
                if options.reverse {
                    KeyRange::new(&last.key, &requested.end)
                } else {
                    KeyRange::new(&requested.begin, &key_after(&last.key))
                }
            }
            _ => requested,
        };
        Ok((pairs, conflict))
    }

    fn validate(&self) -> Result<(), TransactionError> {
        for mutation in &self.mutations {
            let (key, value_len) = match mutation {
                Mutation::Set { key, value } => (key, value.len()),
                Mutation::Clear { key } => (key, 0),
                Mutation::ClearRange { range } => {
                    if range.end.as_slice() > KEYSPACE_END {
                        return Err(TransactionError::InvalidMutation {
                            reason: "clear range extends past the end of the keyspace".into(),
                        });
                    }
                    continue;
                }
            };
            if key.as_slice() >= KEYSPACE_END {
                return Err(TransactionError::InvalidMutation {
                    reason: "key is outside the user keyspace".into(),
                });
            }
            if key.len() > MAX_KEY_SIZE_BYTES {
                return Err(TransactionError::InvalidMutation {
                    reason: format!("key of {} bytes exceeds {MAX_KEY_SIZE_BYTES}", key.len()),
                });
            }
            if value_len > MAX_VALUE_SIZE_BYTES {
                return Err(TransactionError::InvalidMutation {
                    reason: format!("value of {value_len} bytes exceeds {MAX_VALUE_SIZE_BYTES}"),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn get(&mut self, key: &[u8], mode: ReadMode) -> Result<Option<Vec<u8>>, TransactionError> {
        tokio::task::yield_now().await;

        self.add_conflict(mode, KeyRange::single(key));
        if let Some(buffered) = self.buffered(key) {
            return Ok(buffered.map(<[u8]>::to_vec));
        }

        let state = self.state.lock();
        state.check_readable(self.read_version)?;
        Ok(state.data.get(key).and_then(|versions| value_at(versions, self.read_version)).map(<[u8]>::to_vec))
    }

    async fn get_key(&mut self, selector: KeySelector, mode: ReadMode) -> Result<Option<Vec<u8>>, TransactionError> {
        tokio::task::yield_now().await;

        let options = match &selector {
            KeySelector::LastLessThan(anchor) => RangeOptions::new(Vec::new(), anchor.clone()).reversed(),
            KeySelector::LastLessOrEqual(anchor) => RangeOptions::new(Vec::new(), key_after(anchor)).reversed(),
            KeySelector::FirstGreaterThan(anchor) => RangeOptions::new(key_after(anchor), KEYSPACE_END),
            KeySelector::FirstGreaterOrEqual(anchor) => RangeOptions::new(anchor.clone(), KEYSPACE_END),
        }
        .with_limit(1);

        let (pairs, conflict) = self.scan(&options)?;
        self.add_conflict(mode, conflict);
        Ok(pairs.into_iter().next().map(|kv| kv.key))
    }

    async fn get_range(&mut self, options: RangeOptions, mode: ReadMode) -> Result<Vec<KeyValue>, TransactionError> {
        tokio::task::yield_now().await;

        let (pairs, conflict) = self.scan(&options)?;
        self.add_conflict(mode, conflict);
        Ok(pairs)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.mutations.push(Mutation::Set {
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    fn clear(&mut self, key: &[u8]) {
        self.mutations.push(Mutation::Clear { key: key.to_vec() });
    }

    fn clear_range(&mut self, begin: &[u8], end: &[u8]) {
        let range = KeyRange::new(begin, end);
        if !range.is_empty() {
            self.mutations.push(Mutation::ClearRange { range });
        }
    }

    fn add_read_conflict_key(&mut self, key: &[u8]) {
        self.read_conflicts.push(KeyRange::single(key));
    }

    async fn commit(&mut self) -> Result<(), TransactionError> {
        tokio::task::yield_now().await;

        // Reads were served at one version, so a read-only transaction is
        // already serializable there.
        if self.mutations.is_empty() {
            self.read_conflicts.clear();
            self.read_version = self.state.lock().version;
            return Ok(());
        }
        self.validate()?;

        let mut state = self.state.lock();
        if let Some(error) = state.injected_failures.pop_front() {
            trace!(%error, "returning injected commit failure");
            return Err(error);
        }

        let read_version = self.read_version;
        if read_version < state.oldest_checkable_version {
            return Err(TransactionError::TransactionTooOld);
        }
        if state.conflicts_with(read_version, &self.read_conflicts) {
            trace!(read_version, current = state.version, "commit rejected by conflict");
            return Err(TransactionError::NotCommitted);
        }

        let mutations = std::mem::take(&mut self.mutations);
        let version = state.record_commit(mutations.iter().map(Mutation::write_range).collect());
        state.apply(&mutations, version);
        trace!(version, writes = mutations.len(), "transaction committed");

        self.read_conflicts.clear();
        self.read_version = version;
        Ok(())
    }

    fn reset(&mut self) {
        self.read_version = self.state.lock().version;
        self.mutations.clear();
        self.read_conflicts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn put(store: &InMemoryStore, key: &[u8], value: &[u8]) {
        let mut tx = store.begin().unwrap();
        tx.set(key, value);
        tx.commit().await.unwrap();
    }

    fn keys(pairs: &[KeyValue]) -> Vec<&[u8]> {
        pairs.iter().map(|kv| kv.key.as_slice()).collect()
    }

    #[tokio::test]
    async fn test_read_your_writes() {
        let store = InMemoryStore::new();
        put(&store, b"a", b"1").await;

        let mut tx = store.begin().unwrap();
        tx.set(b"b", b"2");
        tx.clear(b"a");
        assert_eq!(tx.get(b"a", ReadMode::Serializable).await.unwrap(), None);
        assert_eq!(tx.get(b"b", ReadMode::Serializable).await.unwrap(), Some(b"2".to_vec()));

        let range = tx.get_range(RangeOptions::new(b"".to_vec(), b"z".to_vec()), ReadMode::Serializable).await.unwrap();
        assert_eq!(keys(&range), vec![b"b".as_slice()]);
    }

    #[tokio::test]
    async fn test_set_after_clear_range_survives() {
        let store = InMemoryStore::new();
        put(&store, b"k1", b"old").await;

        let mut tx = store.begin().unwrap();
        tx.clear_range(b"k", b"l");
        tx.set(b"k2", b"new");
        tx.commit().await.unwrap();

        assert_eq!(keys(&store.dump_range(b"", KEYSPACE_END)), vec![b"k2".as_slice()]);
    }

    #[tokio::test]
    async fn test_range_limit_and_reverse() {
        let store = InMemoryStore::new();
        for key in [b"a", b"b", b"c", b"d"] {
            put(&store, key, b"").await;
        }

        let mut tx = store.begin().unwrap();
        let fwd = tx
            .get_range(RangeOptions::new(b"a".to_vec(), b"d".to_vec()).with_limit(2), ReadMode::Snapshot)
            .await
            .unwrap();
        assert_eq!(keys(&fwd), vec![b"a".as_slice(), b"b".as_slice()]);

        let rev = tx
            .get_range(RangeOptions::new(b"a".to_vec(), b"d".to_vec()).with_limit(2).reversed(), ReadMode::Snapshot)
            .await
            .unwrap();
        assert_eq!(keys(&rev), vec![b"c".as_slice(), b"b".as_slice()]);
    }

    #[tokio::test]
    async fn test_key_selectors() {
        let store = InMemoryStore::new();
        for key in [b"b", b"d"] {
            put(&store, key, b"").await;
        }

        let mut tx = store.begin().unwrap();
        let mode = ReadMode::Snapshot;
        assert_eq!(tx.get_key(KeySelector::last_less_than(b"d".to_vec()), mode).await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(tx.get_key(KeySelector::last_less_or_equal(b"d".to_vec()), mode).await.unwrap(), Some(b"d".to_vec()));
        assert_eq!(tx.get_key(KeySelector::first_greater_than(b"b".to_vec()), mode).await.unwrap(), Some(b"d".to_vec()));
        assert_eq!(
            tx.get_key(KeySelector::first_greater_or_equal(b"c".to_vec()), mode).await.unwrap(),
            Some(b"d".to_vec())
        );
        assert_eq!(tx.get_key(KeySelector::last_less_than(b"b".to_vec()), mode).await.unwrap(), None);
        assert_eq!(tx.get_key(KeySelector::first_greater_than(b"d".to_vec()), mode).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_write_on_read_key_conflicts() {
        let store = InMemoryStore::new();
        put(&store, b"x", b"0").await;

        let mut t1 = store.begin().unwrap();
        let mut t2 = store.begin().unwrap();
        t1.get(b"x", ReadMode::Serializable).await.unwrap();
        t2.get(b"x", ReadMode::Serializable).await.unwrap();
        t1.clear(b"x");
        t2.clear(b"x");

        t1.commit().await.unwrap();
        assert_eq!(t2.commit().await, Err(TransactionError::NotCommitted));
    }

    #[tokio::test]
    async fn test_snapshot_reads_do_not_conflict() {
        let store = InMemoryStore::new();
        put(&store, b"tail", b"0").await;

        let mut t1 = store.begin().unwrap();
        let mut t2 = store.begin().unwrap();
        t1.get_key(KeySelector::last_less_than(b"z".to_vec()), ReadMode::Snapshot).await.unwrap();
        t2.get_key(KeySelector::last_less_than(b"z".to_vec()), ReadMode::Snapshot).await.unwrap();
        t1.set(b"tail1", b"a");
        t2.set(b"tail2", b"b");

        t1.commit().await.unwrap();
        t2.commit().await.unwrap();
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_limited_range_conflicts_only_on_returned_prefix() {
        let store = InMemoryStore::new();
        put(&store, b"q1", b"").await;

        let mut reader = store.begin().unwrap();
        let first = reader
            .get_range(RangeOptions::new(b"q".to_vec(), b"r".to_vec()).with_limit(1), ReadMode::Serializable)
            .await
            .unwrap();
        assert_eq!(keys(&first), vec![b"q1".as_slice()]);
        reader.clear(b"q1");

        // An append past the returned key does not invalidate the reader.
        put(&store, b"q9", b"").await;
        reader.commit().await.unwrap();

        let mut late = store.begin().unwrap();
        let first = late
            .get_range(RangeOptions::new(b"q".to_vec(), b"r".to_vec()).with_limit(1), ReadMode::Serializable)
            .await
            .unwrap();
        late.clear(&first[0].key);
        // An insert before the returned key does.
        put(&store, b"q0", b"").await;
        assert_eq!(late.commit().await, Err(TransactionError::NotCommitted));
    }

    #[tokio::test]
    async fn test_read_only_commit_always_succeeds() {
        let store = InMemoryStore::new();

        let mut tx = store.begin().unwrap();
        tx.get(b"x", ReadMode::Serializable).await.unwrap();
        put(&store, b"x", b"1").await;
        store.inject_commit_failure(TransactionError::NotCommitted);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.set(&[0xFF, 0x01], b"system");
        assert!(matches!(tx.commit().await, Err(TransactionError::InvalidMutation { .. })));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reset_discards_writes() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().unwrap();
        tx.set(b"a", b"1");
        tx.reset();
        tx.commit().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_read_conflict_key() {
        let store = InMemoryStore::new();

        let mut tx = store.begin().unwrap();
        tx.get(b"unrelated", ReadMode::Serializable).await.unwrap();
        tx.add_read_conflict_key(b"guard");
        tx.set(b"out", b"1");

        put(&store, b"guard", b"changed").await;
        assert_eq!(tx.commit().await, Err(TransactionError::NotCommitted));
    }

    #[tokio::test]
    async fn test_reads_see_one_consistent_version() {
        let store = InMemoryStore::new();

        let mut reader = store.begin().unwrap();
        assert_eq!(reader.get(b"a", ReadMode::Serializable).await.unwrap(), None);

        let mut writer = store.begin().unwrap();
        writer.set(b"a", b"1");
        writer.set(b"b", b"1");
        writer.commit().await.unwrap();

        // The writer's commit is atomic: the reader sees none of it.
        assert_eq!(reader.get(b"b", ReadMode::Serializable).await.unwrap(), None);
        let range = reader.get_range(RangeOptions::new(b"a".to_vec(), b"z".to_vec()), ReadMode::Snapshot).await.unwrap();
        assert!(range.is_empty());
        reader.commit().await.unwrap();

        // After committing, the handle reads the latest state.
        assert_eq!(reader.get(b"b", ReadMode::Serializable).await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_cleared_keys_stay_visible_to_older_readers() {
        let store = InMemoryStore::new();
        put(&store, b"k", b"old").await;

        let mut reader = store.begin().unwrap();
        let mut writer = store.begin().unwrap();
        writer.clear_range(b"a", b"z");
        writer.commit().await.unwrap();

        assert_eq!(reader.get(b"k", ReadMode::Snapshot).await.unwrap(), Some(b"old".to_vec()));
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }
}
