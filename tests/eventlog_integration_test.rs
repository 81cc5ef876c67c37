//! Integration tests for the sharded event log.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use aspen_layer::Subspace;
use aspen_layer::Tuple;
use aspen_queue::ContentionMode;
use aspen_queue::EventLog;
use aspen_queue::EventRecord;
use aspen_queue::Queue;
use aspen_txn::InMemoryStore;
use aspen_txn::RetryPolicy;
use aspen_txn::Transaction;
use aspen_txn::TransactionalStore;
use tokio::task::JoinSet;
use tokio::time::timeout;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("aspen_queue=debug").try_init();
}

fn batch(appender: usize, size: usize) -> Vec<EventRecord> {
    (0..size)
        .map(|n| EventRecord {
            contract: format!("appender-{appender}"),
            data: format!("{appender}:{n}").into_bytes(),
            meta: vec![appender as u8, n as u8],
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_never_conflict() -> Result<()> {
    init_tracing();
    const APPENDERS: usize = 8;
    const BATCH: usize = 5;

    let store = InMemoryStore::new();
    // A single attempt: any conflict between appenders fails the test.
    let log = EventLog::new(Subspace::new(&Tuple::new().push("log"))).with_retry_policy(RetryPolicy {
        max_attempts: Some(1),
        ..RetryPolicy::default()
    });

    let shards = timeout(Duration::from_secs(30), async {
        let mut appenders = JoinSet::new();
        for appender in 0..APPENDERS {
            let (store, log) = (store.clone(), log.clone());
            appenders.spawn(async move { log.append(&store, &batch(appender, BATCH)).await });
        }
        let mut shards = HashSet::new();
        while let Some(joined) = appenders.join_next().await {
            shards.insert(joined??);
        }
        Ok::<_, anyhow::Error>(shards)
    })
    .await
    .context("appenders timed out")??;
    assert_eq!(shards.len(), APPENDERS);

    let mut tx = store.begin()?;
    let events = log.read_all(&mut tx, 0).await?;
    assert_eq!(events.len(), APPENDERS * BATCH);

    // Within each shard the batch order survives.
    for shard in &shards {
        let seqs: Vec<i64> = events.iter().filter(|e| &e.shard == shard).map(|e| e.seq).collect();
        assert_eq!(seqs, (0..BATCH as i64).collect::<Vec<_>>());
    }
    Ok(())
}

#[tokio::test]
async fn test_log_and_queue_share_a_store() -> Result<()> {
    init_tracing();
    let store = InMemoryStore::new();
    let log = EventLog::new(Subspace::new(&Tuple::new().push("app").push("events")));
    let queue = Queue::new(Subspace::new(&Tuple::new().push("app").push("jobs")), ContentionMode::High);

    log.append(&store, &batch(0, 2)).await?;
    let mut tx = store.begin()?;
    queue.push(&mut tx, b"job").await?;
    tx.commit().await?;

    log.clear(&store).await?;

    let mut tx = store.begin()?;
    assert!(log.read_all(&mut tx, 0).await?.is_empty());
    assert_eq!(queue.peek(&mut tx).await?, Some(b"job".to_vec()));
    Ok(())
}
