use std::sync::Arc;

use capt_store::{ObjectKey, ObjectStore, StoreError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{TICKET_CLUSTER_KIND, TicketCluster};
use crate::dispatch::{Dispatch, DispatchError, DispatchRequest};
use crate::owner::{OwnerLookup, resolve_owner};
use crate::patch::PatchHelper;
use crate::pause::is_paused;

#[derive(thiserror::Error, Debug)]
pub enum ReconcileError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Invocation cancelled before its side effect; no mutation was
    /// made, the trigger is simply redriven.
    #[error("reconcile cancelled")]
    Cancelled,
}

/// Terminal state of one invocation, derived from the object and its
/// completion token. Only `Dispatched` carries a mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Absent,
    OwnerUnresolved,
    Paused,
    AlreadyCompleted,
    Dispatched { message_id: String },
}

#[derive(Clone, Debug, Default)]
pub struct ReconcilePolicy {
    /// Carry an expected-version precondition on commit. Only needed
    /// when the trigger queue cannot guarantee per-identity mutual
    /// exclusion.
    pub optimistic_lock: bool,
}

/// The reconciliation core. Collaborators are injected, so tests run
/// against in-memory fakes.
pub struct Reconciler {
    store: Arc<dyn ObjectStore>,
    dispatch: Arc<dyn Dispatch>,
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        dispatch: Arc<dyn Dispatch>,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            store,
            dispatch,
            policy,
        }
    }

    /// Drive one ticket cluster toward its desired state. Idempotent:
    /// once `status.message_id` is recorded, re-invocation is a no-op.
    /// The commit is the only mutating step and runs last, so a failure
    /// anywhere earlier leaves no partial state behind.
    pub async fn reconcile(
        &self,
        key: &ObjectKey,
        cancel: &CancellationToken,
    ) -> Result<Outcome, ReconcileError> {
        let Some(record) =
            self.store.get(TICKET_CLUSTER_KIND, key).await?
        else {
            // Deletion is a normal terminal outcome, not a failure.
            info!(%key, "ticket cluster is gone");
            return Ok(Outcome::Absent);
        };
        let mut obj = TicketCluster::from_record(&record)
            .map_err(ReconcileError::Store)?;

        let owner = match resolve_owner(self.store.as_ref(), &obj.metadata)
            .await?
        {
            OwnerLookup::Unset => {
                info!(%key, "cluster controller has not yet set owner_ref");
                return Ok(Outcome::OwnerUnresolved);
            }
            OwnerLookup::NotFound => {
                info!(%key, "owner cluster not found");
                return Ok(Outcome::OwnerUnresolved);
            }
            OwnerLookup::Found(owner) => owner,
        };

        if is_paused(
            Some(&owner.metadata.annotations),
            Some(&obj.metadata.annotations),
        ) {
            info!(%key, "paused, won't reconcile");
            return Ok(Outcome::Paused);
        }

        if let Some(message_id) = &obj.status.message_id {
            debug!(%key, %message_id, "already reconciled");
            return Ok(Outcome::AlreadyCompleted);
        }

        if cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }

        let request = DispatchRequest {
            subject: format!(
                "[{}] New Cluster {} requested",
                obj.spec.priority, owner.metadata.name
            ),
            body: format!(
                "Hello! One TicketCluster please. \n\n{}\n",
                obj.spec.request
            ),
        };

        // Snapshot before mutating, dispatch, then record the token.
        // A commit failure after dispatch is the accepted at-least-once
        // window; the backend dedupes on its side.
        let helper = PatchHelper::new(&obj, record.version)?;
        let message_id = self.dispatch.dispatch(&request).await?;
        obj.status.message_id = Some(message_id.clone());
        helper
            .commit(
                self.store.as_ref(),
                &obj,
                self.policy.optimistic_lock,
            )
            .await?;

        info!(%key, %message_id, "reconciled, request dispatched");
        Ok(Outcome::Dispatched { message_id })
    }
}
