use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use capt_store::ObjectKey;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::controller::Reconciler;

/// Trigger queue feeding the worker pool. A key always hashes to the
/// same worker, and each worker drains its channel sequentially, which
/// gives the per-identity mutual exclusion the reconcile core relies
/// on; distinct identities still proceed concurrently across workers.
pub struct TriggerQueue {
    shards: Vec<flume::Sender<ObjectKey>>,
}

impl TriggerQueue {
    /// Spawn `workers` reconcile loops. Failed reconciliations are
    /// requeued after `backoff`.
    pub fn spawn(
        reconciler: Arc<Reconciler>,
        workers: usize,
        backoff: Duration,
        cancel: CancellationToken,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let workers = workers.max(1);
        let mut shards = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let (tx, rx) = flume::unbounded::<ObjectKey>();
            let reconciler = reconciler.clone();
            let cancel = cancel.clone();
            let requeue = tx.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        received = rx.recv_async() => match received {
                            Ok(key) => {
                                run_one(
                                    &reconciler,
                                    key,
                                    &requeue,
                                    backoff,
                                    &cancel,
                                    worker,
                                )
                                .await;
                            }
                            Err(_) => break,
                        },
                        _ = cancel.cancelled() => break,
                    }
                }
                info!(worker, "trigger worker stopped");
            }));
            shards.push(tx);
        }
        (Self { shards }, handles)
    }

    pub fn trigger(&self, key: ObjectKey) {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let shard = (hasher.finish() as usize) % self.shards.len();
        let _ = self.shards[shard].send(key);
    }
}

async fn run_one(
    reconciler: &Reconciler,
    key: ObjectKey,
    requeue: &flume::Sender<ObjectKey>,
    backoff: Duration,
    cancel: &CancellationToken,
    worker: usize,
) {
    match reconciler.reconcile(&key, cancel).await {
        Ok(outcome) => {
            info!(worker, %key, ?outcome, "reconciled");
        }
        Err(e) => {
            error!(worker, %key, error = %e, "reconcile failed, requeueing");
            let requeue = requeue.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {
                        let _ = requeue.send(key);
                    }
                    _ = cancel.cancelled() => {}
                }
            });
        }
    }
}
