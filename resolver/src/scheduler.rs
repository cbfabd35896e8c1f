//! Bounded worker pool turning a set of identifiers into outcome records.
//!
//! A fixed set of worker tasks drains a shared queue; results flow back over
//! an mpsc channel in whatever order lookups finish. The pool guarantees
//! exactly one outcome per identifier: a permanently failing identifier
//! produces an error record, and a cancelled run drains the remaining queue
//! as [`LookupOutcome::Cancelled`] records instead of dropping them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::doi::Doi;
use crate::outcome::LookupOutcome;
use crate::retry::{resolve_with_retry, RetryPolicy};
use crate::source::DateSource;

/// Progress callback: `(completed, total)`. Invoked once per finished
/// record, from the collector; `completed` is monotonically non-decreasing.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Resolves every identifier in `ids` with at most `concurrency` lookups in
/// flight, returning one `(doi, outcome)` pair per identifier in completion
/// order. Never returns early: cancellation converts the unfinished
/// remainder to [`LookupOutcome::Cancelled`] within a bounded grace period.
pub async fn resolve_all(
    ids: Vec<Doi>,
    source: Arc<dyn DateSource>,
    policy: RetryPolicy,
    concurrency: usize,
    progress: Option<ProgressFn>,
    cancel: CancellationToken,
) -> Vec<(Doi, LookupOutcome)> {
    let total = ids.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = concurrency.max(1).min(total);
    info!(total, workers, "starting resolution");

    let queue: Arc<Mutex<VecDeque<Doi>>> = Arc::new(Mutex::new(ids.into_iter().collect()));
    let (tx, mut rx) = mpsc::channel::<(Doi, LookupOutcome)>(total);

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let source = Arc::clone(&source);
        let policy = policy.clone();
        let cancel = cancel.clone();
        let tx = tx.clone();
        handles.push(tokio::spawn(async move {
            debug!(worker_id, "worker started");
            loop {
                let next = queue.lock().expect("work queue lock poisoned").pop_front();
                let Some(doi) = next else { break };
                let outcome = if cancel.is_cancelled() {
                    LookupOutcome::Cancelled
                } else {
                    resolve_with_retry(source.as_ref(), &doi, &policy, &cancel).await
                };
                // Channel capacity equals `total`, so sends never block; an
                // error only means the collector is gone.
                if tx.send((doi, outcome)).await.is_err() {
                    break;
                }
            }
            debug!(worker_id, "worker finished");
        }));
    }
    drop(tx);

    // Progress is reported here rather than by the workers: the single
    // collector serializes callbacks, so `completed` can never be observed
    // going backwards however the workers interleave.
    let mut records = Vec::with_capacity(total);
    while let Some(record) = rx.recv().await {
        records.push(record);
        if let Some(callback) = &progress {
            callback(records.len(), total);
        }
    }
    for handle in handles {
        // Worker tasks neither panic nor get aborted; join errors would only
        // come from a shutting-down runtime.
        let _ = handle.await;
    }
    info!(total = records.len(), "resolution finished");
    records
}
