//! Retry loop for transactional bodies.

use std::future::Future;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use crate::constants::DEFAULT_TRANSACT_INITIAL_BACKOFF_MS;
use crate::constants::DEFAULT_TRANSACT_MAX_BACKOFF_MS;
use crate::error::Retryable;
use crate::error::TransactionError;
use crate::traits::Transaction;
use crate::traits::TransactionalStore;

/// Attempt limit and backoff for [`transact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up, including the first. `None` retries until the body or commit
    /// fails with a non-retryable error.
    pub max_attempts: Option<u32>,
    /// Delay after the first conflict.
    pub initial_backoff_ms: u64,
    /// Ceiling for the doubling delay.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_backoff_ms: DEFAULT_TRANSACT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_TRANSACT_MAX_BACKOFF_MS,
        }
    }
}

/// Run `body` in a transaction and commit, retrying conflict-class failures.
///
/// The body receives the transaction by value and hands it back alongside its
/// result, which keeps borrowed captures out of the future's lifetime. Between
/// attempts the transaction is [`reset`](Transaction::reset) and the loop
/// sleeps with doubling backoff. Errors that are not retryable, from the body
/// or from commit, are returned immediately. Conflicts are retried without
/// limit unless the policy sets `max_attempts`; reaching that limit returns
/// `TransactionError::RetryLimitExceeded` converted into `E`.
///
/// ```ignore
/// let value = transact(&store, &RetryPolicy::default(), |mut tx| async move {
///     let result = tx.get(b"counter", ReadMode::Serializable).await.map_err(MyError::from);
///     (tx, result)
/// })
/// .await?;
/// ```
pub async fn transact<S, F, Fut, T, E>(store: &S, policy: &RetryPolicy, mut body: F) -> Result<T, E>
where
    S: TransactionalStore + ?Sized,
    F: FnMut(S::Transaction) -> Fut,
    Fut: Future<Output = (S::Transaction, Result<T, E>)>,
    E: From<TransactionError> + Retryable + std::fmt::Display,
{
    debug_assert!(policy.max_attempts != Some(0), "TRANSACT: max_attempts must be positive");

    let mut tx = store.begin()?;
    let mut backoff_ms = policy.initial_backoff_ms;
    let mut attempt = 0u32;

    loop {
        attempt = attempt.saturating_add(1);

        let (returned, result) = body(tx).await;
        tx = returned;

        let err = match result {
            Ok(value) => match tx.commit().await {
                Ok(()) => return Ok(value),
                Err(e) => E::from(e),
            },
            Err(e) => e,
        };

        if !err.is_retryable() {
            return Err(err);
        }

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            warn!(attempt, error = %err, "transaction retry limit reached");
            return Err(E::from(TransactionError::RetryLimitExceeded { attempts: attempt }));
        }

        debug!(attempt, backoff_ms, error = %err, "retrying conflicted transaction");
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        backoff_ms = backoff_ms.saturating_mul(2).min(policy.max_backoff_ms);
        tx.reset();
    }
}
