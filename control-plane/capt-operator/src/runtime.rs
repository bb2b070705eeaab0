use std::sync::Arc;

use capt_store::{MemoryStore, ObjectStore, Trigger};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api::{CLUSTER_KIND, TICKET_CLUSTER_KIND, TicketCluster};
use crate::config::{OperatorConfig, StorageType};
use crate::controller::Reconciler;
use crate::dispatch::LogDispatch;
use crate::queue::TriggerQueue;

/// Wire the store, dispatch backend, reconciler and trigger workers,
/// then run until a shutdown signal arrives.
pub async fn run(cfg: OperatorConfig) -> anyhow::Result<()> {
    let store = match cfg.storage() {
        StorageType::Memory => Arc::new(MemoryStore::new()),
    };
    let events = store.subscribe();

    let dispatch = Arc::new(LogDispatch::new(cfg.recipient.clone()));
    let reconciler = Arc::new(Reconciler::new(
        store.clone() as Arc<dyn ObjectStore>,
        dispatch,
        cfg.policy(),
    ));

    let cancel = CancellationToken::new();
    let (queue, mut handles) = TriggerQueue::spawn(
        reconciler,
        cfg.workers,
        cfg.requeue_backoff(),
        cancel.clone(),
    );
    handles.push(tokio::spawn(forward_triggers(
        store.clone(),
        events,
        queue,
        cancel.clone(),
    )));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    cancel.cancel();
    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}

/// Route store change triggers to the reconcile queue. Ticket cluster
/// changes map one-to-one; owner cluster changes fan out to the owned
/// ticket clusters so pause or ownership updates take effect without a
/// child write.
pub async fn forward_triggers(
    store: Arc<MemoryStore>,
    events: flume::Receiver<Trigger>,
    queue: TriggerQueue,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            received = events.recv_async() => match received {
                Ok(trigger) => {
                    route_trigger(store.as_ref(), &queue, trigger).await
                }
                Err(_) => break,
            },
            _ = cancel.cancelled() => break,
        }
    }
    info!("trigger forwarder stopped");
}

async fn route_trigger(
    store: &MemoryStore,
    queue: &TriggerQueue,
    trigger: Trigger,
) {
    if trigger.kind == TICKET_CLUSTER_KIND {
        queue.trigger(trigger.key);
        return;
    }
    if trigger.kind != CLUSTER_KIND {
        return;
    }

    match store.list(TICKET_CLUSTER_KIND).await {
        Ok(items) => {
            for (key, record) in items {
                let Ok(child) = TicketCluster::from_record(&record) else {
                    continue;
                };
                let owned = child.metadata.namespace
                    == trigger.key.namespace
                    && child.metadata.owner_ref.as_ref().is_some_and(|r| {
                        r.kind == CLUSTER_KIND && r.name == trigger.key.name
                    });
                if owned {
                    queue.trigger(key);
                }
            }
        }
        Err(e) => {
            error!(error = %e, "failed listing ticket clusters for owner trigger")
        }
    }
}
