//! High-contention pop: waiter registration, fulfilment sweeps, and polling.
//!
//! A popper that cannot take the head item directly registers a waiter at the
//! tail of `root / "pop"`. Sweeps, run by every waiting popper, pair waiters
//! and items oldest-first and move each item's value into the waiter's result
//! slot. Waiters left over when the items run out are cleared, which tells
//! their poppers the queue was empty.
//!
//! All coordination state lives in the store, so poppers in different
//! processes cooperate through the same sweeps.

use std::time::Duration;

use aspen_txn::RangeOptions;
use aspen_txn::ReadMode;
use aspen_txn::Retryable;
use aspen_txn::Transaction;
use aspen_txn::TransactionalStore;
use aspen_txn::transact;
use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::Queue;
use super::keys;
use crate::constants::SWEEP_ATTEMPTS_PER_ROUND;
use crate::error::QueueError;
use crate::error::printable;
use crate::random::RandomId;

/// A registered waiter and where its result will be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Waiter {
    pub(crate) key: Vec<u8>,
    pub(crate) id: RandomId,
    pub(crate) result_key: Vec<u8>,
}

/// Outcome of withdrawing a waiter after its deadline.
#[derive(Debug, PartialEq, Eq)]
enum Withdrawal {
    /// The waiter record was still pending and has been removed.
    Withdrawn,
    /// A sweep had already delivered an item; it has been collected.
    Collected(Vec<u8>),
    /// A sweep had released the waiter without an item.
    Released,
}

impl Queue {
    pub(super) async fn pop_high_contention<S>(&self, store: &S) -> Result<Option<Vec<u8>>, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        let mut tx = store.begin()?;

        // Earlier waiters go first: only pop directly when nobody is waiting.
        let registered = match self.register_waiter(&mut tx, false).await? {
            None => {
                let popped = self.pop_simple(&mut tx).await?;
                match tx.commit().await {
                    Ok(()) => {
                        debug!(found = popped.is_some(), "uncontended pop");
                        return Ok(popped);
                    }
                    Err(e) if e.is_retryable() => {
                        debug!(error = %e, "direct pop conflicted");
                        None
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Some(waiter) => match tx.commit().await {
                Ok(()) => Some(waiter),
                Err(e) if e.is_retryable() => {
                    debug!(error = %e, "waiter registration conflicted");
                    None
                }
                Err(e) => return Err(e.into()),
            },
        };

        let waiter = match registered {
            Some(waiter) => waiter,
            None => self.register_forced(store).await?,
        };
        info!(waiter = %printable(&waiter.key), "registered as waiter");

        self.await_fulfilment(store, &waiter).await
    }

    /// Register a waiter at the tail of the waiter namespace.
    ///
    /// Unless `forced`, returns `None` without writing anything when no
    /// other waiter exists.
    pub(crate) async fn register_waiter<T>(&self, tx: &mut T, forced: bool) -> Result<Option<Waiter>, QueueError>
    where
        T: Transaction + ?Sized,
    {
        let index = Self::next_index(tx, &self.waiters).await?;
        if index == 0 && !forced {
            return Ok(None);
        }
        self.add_waiter(tx, index).await.map(Some)
    }

    async fn add_waiter<T>(&self, tx: &mut T, index: i64) -> Result<Waiter, QueueError>
    where
        T: Transaction + ?Sized,
    {
        let id = self.next_random_id();
        let key = keys::indexed_key(&self.waiters, index, &id);
        // Serializable read so two registrations of the same key conflict.
        tx.get(&key, ReadMode::Serializable).await?;
        tx.set(&key, b"");
        trace!(index, "waiter written");
        Ok(Waiter {
            result_key: keys::result_key(&self.results, &id),
            key,
            id,
        })
    }

    async fn register_forced<S>(&self, store: &S) -> Result<Waiter, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        transact(store, &self.config.retry_policy(), |mut tx| async move {
            let result = match Self::next_index(&mut tx, &self.waiters).await {
                Ok(index) => self.add_waiter(&mut tx, index).await,
                Err(e) => Err(e),
            };
            (tx, result)
        })
        .await
    }

    /// One fulfilment sweep in a single transaction.
    ///
    /// Pairs up to `sweep_batch_size` waiters with as many items, oldest
    /// first, and releases unmatched waiters. Returns `true` when the waiter
    /// backlog is drained, i.e. fewer than a full batch of waiters was seen.
    /// A commit conflict is returned as a retryable error.
    pub(crate) async fn fulfil_conflicted_pops<S>(&self, store: &S) -> Result<bool, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        let mut tx = store.begin()?;
        let drained = self.fulfil_in(&mut tx).await?;
        tx.commit().await?;
        Ok(drained)
    }

    async fn fulfil_in<T>(&self, tx: &mut T) -> Result<bool, QueueError>
    where
        T: Transaction + ?Sized,
    {
        let batch = self.config.sweep_batch_size;
        let waiters = tx
            .get_range(RangeOptions::from_range(self.waiters.range()).with_limit(batch), ReadMode::Serializable)
            .await?;
        let items = tx
            .get_range(RangeOptions::from_range(self.items.range()).with_limit(batch), ReadMode::Serializable)
            .await?;

        let paired = waiters.len().min(items.len());
        for (waiter, item) in waiters.iter().zip(&items) {
            let id = keys::decode_waiter_id(&self.waiters, &waiter.key)?;
            tx.set(&keys::result_key(&self.results, &id), &item.value);
            tx.add_read_conflict_key(&item.key);
            tx.add_read_conflict_key(&waiter.key);
            tx.clear(&waiter.key);
            tx.clear(&item.key);
        }
        for waiter in &waiters[paired..] {
            tx.add_read_conflict_key(&waiter.key);
            tx.clear(&waiter.key);
        }

        if !waiters.is_empty() {
            debug!(waiters = waiters.len(), paired, released = waiters.len() - paired, "fulfilment sweep");
        }
        Ok(waiters.len() < batch)
    }

    /// Sweep until the backlog drains.
    ///
    /// A conflicted sweep is retried at once, up to `SWEEP_ATTEMPTS_PER_ROUND`
    /// conflicts; past that the round ends and the caller backs off.
    async fn sweep<S>(&self, store: &S) -> Result<(), QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        let mut conflicts = 0u32;
        loop {
            match self.fulfil_conflicted_pops(store).await {
                Ok(true) => return Ok(()),
                Ok(false) => continue,
                Err(e) if e.is_retryable() => {
                    conflicts += 1;
                    if conflicts >= SWEEP_ATTEMPTS_PER_ROUND {
                        debug!(conflicts, error = %e, "sweep kept conflicting, backing off");
                        return Ok(());
                    }
                    trace!(conflicts, error = %e, "sweep conflicted, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Poll until `waiter` is fulfilled or released, sweeping on every round.
    pub(crate) async fn await_fulfilment<S>(&self, store: &S, waiter: &Waiter) -> Result<Option<Vec<u8>>, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        let started = Instant::now();
        let deadline = self.config.pop_wait_timeout().map(|timeout| started + timeout);
        let mut backoff_ms = self.config.initial_backoff_ms;

        loop {
            self.sweep(store).await?;

            let mut tx = store.begin()?;
            if tx.get(&waiter.key, ReadMode::Serializable).await?.is_some() {
                let mut delay = Duration::from_millis(backoff_ms);
                if let Some(deadline) = deadline {
                    let now = Instant::now();
                    if now >= deadline {
                        let waited_ms = now.duration_since(started).as_millis() as u64;
                        return self.give_up(store, waiter, waited_ms).await;
                    }
                    delay = delay.min(deadline - now);
                }
                trace!(backoff_ms, "waiter pending");
                tokio::time::sleep(delay).await;
                backoff_ms = backoff_ms.saturating_mul(2).min(self.config.max_backoff_ms);
                continue;
            }

            let Some(stored) = tx.get(&waiter.result_key, ReadMode::Serializable).await? else {
                info!(waiter = %printable(&waiter.key), "waiter released without an item");
                return Ok(None);
            };
            let payload = keys::decode_value(&waiter.result_key, &stored)?;
            tx.clear(&waiter.result_key);

            match tx.commit().await {
                Ok(()) => {
                    info!(waiter = %printable(&waiter.key), payload_len = payload.len(), "waiter fulfilled");
                    return Ok(Some(payload));
                }
                Err(e) if e.is_retryable() => {
                    debug!(error = %e, "collecting result conflicted");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn give_up<S>(&self, store: &S, waiter: &Waiter, waited_ms: u64) -> Result<Option<Vec<u8>>, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        match self.withdraw(store, waiter).await? {
            Withdrawal::Withdrawn => {
                warn!(waiter = %printable(&waiter.key), waited_ms, "pop wait timed out");
                Err(QueueError::WaitTimeout { waited_ms })
            }
            Withdrawal::Collected(payload) => Ok(Some(payload)),
            Withdrawal::Released => Ok(None),
        }
    }

    async fn withdraw<S>(&self, store: &S, waiter: &Waiter) -> Result<Withdrawal, QueueError>
    where
        S: TransactionalStore + ?Sized,
    {
        transact(store, &self.config.retry_policy(), |mut tx| async move {
            let result = self.withdraw_in(&mut tx, waiter).await;
            (tx, result)
        })
        .await
    }

    async fn withdraw_in<T>(&self, tx: &mut T, waiter: &Waiter) -> Result<Withdrawal, QueueError>
    where
        T: Transaction + ?Sized,
    {
        if tx.get(&waiter.key, ReadMode::Serializable).await?.is_some() {
            tx.clear(&waiter.key);
            return Ok(Withdrawal::Withdrawn);
        }
        match tx.get(&waiter.result_key, ReadMode::Serializable).await? {
            Some(stored) => {
                let payload = keys::decode_value(&waiter.result_key, &stored)?;
                tx.clear(&waiter.result_key);
                Ok(Withdrawal::Collected(payload))
            }
            None => Ok(Withdrawal::Released),
        }
    }
}
