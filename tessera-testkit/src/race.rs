//! Concurrent writer harness.
//!
//! Spawns writers that line up on a barrier and yield to the scheduler right
//! before they write. The testkit enables `tessera-store/test-util`, which
//! adds a second yield between version resolution and the write lock, so an
//! `ExpectedVersion::Auto` writer can resolve a tail that another writer
//! commits past. Run inside a multi-threaded runtime.

use crate::helpers::record;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tessera_domain::{ExpectedVersion, Specification, Stream};
use tessera_store::{EventRepository, StoreError};
use tokio::sync::Barrier;
use tokio::task::JoinSet;

/// How a race ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceOutcome {
    /// Writers whose append committed
    pub committed: usize,
    /// Writers rejected with `WrongExpectedEventVersion`
    pub conflicts: usize,
}

impl RaceOutcome {
    pub fn total(&self) -> usize {
        self.committed + self.conflicts
    }
}

/// `writers` tasks each append one record to `stream` with `expected_version`.
///
/// Any error other than a version conflict fails the whole race.
pub async fn race_appends<R>(
    repo: Arc<R>,
    stream: Stream,
    writers: usize,
    expected_version: ExpectedVersion,
) -> Result<RaceOutcome>
where
    R: EventRepository + 'static,
{
    let barrier = Arc::new(Barrier::new(writers));
    let mut tasks = JoinSet::new();

    for writer in 0..writers {
        let repo = Arc::clone(&repo);
        let stream = stream.clone();
        let barrier = Arc::clone(&barrier);

        tasks.spawn(async move {
            barrier.wait().await;
            tokio::task::yield_now().await;
            repo.append_to_stream(vec![record(&format!("Writer{}", writer))], &stream, expected_version)
                .await
        });
    }

    collect(tasks).await
}

/// `writers` tasks each read the stream's tail, yield, then append with
/// `ExpectedVersion::Exact(tail)`.
///
/// This is the read-then-write pattern `ExpectedVersion::Auto` relies on
/// callers to serialize; unserialized, most writers should conflict.
pub async fn race_read_then_append<R>(repo: Arc<R>, stream: Stream, writers: usize) -> Result<RaceOutcome>
where
    R: EventRepository + 'static,
{
    let barrier = Arc::new(Barrier::new(writers));
    let mut tasks = JoinSet::new();

    for writer in 0..writers {
        let repo = Arc::clone(&repo);
        let stream = stream.clone();
        let barrier = Arc::clone(&barrier);

        tasks.spawn(async move {
            barrier.wait().await;
            read_then_append(repo.as_ref(), &stream, writer).await
        });
    }

    collect(tasks).await
}

async fn read_then_append<R>(repo: &R, stream: &Stream, writer: usize) -> Result<(), StoreError>
where
    R: EventRepository,
{
    let count = repo.count(&Specification::new(stream.clone())).await?;
    let tail = count as i64 - 1;
    tokio::task::yield_now().await;

    repo.append_to_stream(
        vec![record(&format!("Writer{}", writer))],
        stream,
        ExpectedVersion::Exact(tail),
    )
    .await
}

async fn collect(mut tasks: JoinSet<Result<(), StoreError>>) -> Result<RaceOutcome> {
    let mut outcome = RaceOutcome::default();

    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(()) => outcome.committed += 1,
            Err(e) if e.is_conflict() => outcome.conflicts += 1,
            Err(e) => return Err(anyhow!("writer failed: {}", e)),
        }
    }

    Ok(outcome)
}
