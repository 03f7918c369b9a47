use crate::probe;
use crate::types::{ProbeOutcome, ScanSummary, StreamEntry};
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Probe every playlist entry with a bounded number of concurrent workers.
///
/// - Limits in-flight probes with a `Semaphore`; all entries are dispatched
///   up front and the pool applies back-pressure internally.
/// - Each probe is bounded by `timeout` (see `probe::probe_entry`).
/// - Outcomes arrive in completion order; the returned summary is assembled
///   in playlist order so report numbering and fragment files stay stable.
pub async fn scan_entries(
    entries: &[StreamEntry],
    timeout: Duration,
    concurrency: usize,
) -> Result<ScanSummary> {
    scan_entries_internal(entries, timeout, concurrency, None, None).await
}

/// Variant that accepts a `CancellationToken` to allow external cancellation.
pub async fn scan_entries_with_cancel(
    entries: &[StreamEntry],
    timeout: Duration,
    concurrency: usize,
    cancel: CancellationToken,
) -> Result<ScanSummary> {
    scan_entries_internal(entries, timeout, concurrency, Some(cancel), None).await
}

/// Live counters and the in-flight outcome list, shared with a consumer
/// (the web UI polls these while a scan runs).
#[derive(Clone, Debug)]
pub struct SharedProgress {
    pub completed: Arc<AtomicU64>,
    pub reachable: Arc<AtomicU64>,
    pub outcomes: Arc<Mutex<Vec<(usize, ProbeOutcome)>>>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self {
            completed: Arc::new(AtomicU64::new(0)),
            reachable: Arc::new(AtomicU64::new(0)),
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for SharedProgress {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn scan_entries_with_shared(
    entries: &[StreamEntry],
    timeout: Duration,
    concurrency: usize,
    cancel: CancellationToken,
    shared: SharedProgress,
) -> Result<ScanSummary> {
    scan_entries_internal(entries, timeout, concurrency, Some(cancel), Some(shared)).await
}

async fn scan_entries_internal(
    entries: &[StreamEntry],
    timeout: Duration,
    concurrency: usize,
    cancel_opt: Option<CancellationToken>,
    shared_opt: Option<SharedProgress>,
) -> Result<ScanSummary> {
    let total = entries.len() as u64;
    let shared = shared_opt.unwrap_or_default();
    let (completed, reachable, outcomes) = (
        shared.completed.clone(),
        shared.reachable.clone(),
        shared.outcomes.clone(),
    );

    // One client per scan, shared read-only by all workers.
    let client = probe::new_client()?;
    let sem = Arc::new(Semaphore::new(concurrency.clamp(1, 100)));
    let mut set = JoinSet::new();
    let cancel = cancel_opt.unwrap_or_default();

    for (idx, entry) in entries.iter().cloned().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let sem = sem.clone();
        let client = client.clone();
        let outcomes = outcomes.clone();
        let completed = completed.clone();
        let reachable = reachable.clone();
        let cancel = cancel.clone();

        set.spawn(async move {
            // The permit is what bounds concurrency; queued tasks wait here.
            let _permit = sem.acquire_owned().await.expect("semaphore in scope");

            // Checked between dispatches, never mid-probe: a cancelled scan
            // starts no new probes and queued tasks are abandoned.
            if cancel.is_cancelled() {
                return;
            }

            let outcome = probe::probe_entry(&client, &entry, timeout).await;

            // A probe that finished after cancellation is not emitted.
            if cancel.is_cancelled() {
                return;
            }

            if outcome.reachable {
                reachable.fetch_add(1, Ordering::Relaxed);
            }
            let mut guard = outcomes.lock().await;
            guard.push((idx, outcome));
            drop(guard);
            completed.fetch_add(1, Ordering::Relaxed);
        });
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            // A panic escaping a probe is a defect, not an expected failure:
            // abort the remaining work and surface it to the caller.
            set.abort_all();
            return Err(anyhow!("probe task failed: {e}"));
        }
    }

    // Completion order is arbitrary; rebuild the summary in playlist order.
    let mut collected = outcomes.lock().await.clone();
    collected.sort_by_key(|(idx, _)| *idx);

    let mut summary = ScanSummary::new(total);
    for (_, outcome) in collected {
        summary.record(outcome);
    }
    Ok(summary)
}
