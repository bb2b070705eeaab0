use capt_store::{
    ObjectKey, ObjectStore, PatchParams, PatchScope, StoreError, merge,
};
use serde_json::Value;

use crate::api::{TICKET_CLUSTER_KIND, TicketCluster};

/// Snapshot-then-diff commit protocol. Acquire the helper before
/// mutating the in-memory object; on commit only the fields actually
/// touched since the snapshot are sent, so concurrent writers to
/// unrelated fields are never clobbered. Body and status are patched as
/// independent sub-resources.
pub struct PatchHelper {
    key: ObjectKey,
    version: u64,
    body_before: Value,
    status_before: Value,
}

impl PatchHelper {
    pub fn new(
        obj: &TicketCluster,
        version: u64,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            key: obj.key(),
            version,
            body_before: obj.to_body().map_err(StoreError::from)?,
            status_before: obj.to_status().map_err(StoreError::from)?,
        })
    }

    /// Commit the difference between the snapshot and `obj`. At most
    /// one patch per scope; scopes with an empty diff are skipped.
    /// Store rejections propagate; there is no retry here, redrive
    /// re-evaluates from fresh state.
    pub async fn commit(
        self,
        store: &dyn ObjectStore,
        obj: &TicketCluster,
        optimistic_lock: bool,
    ) -> Result<(), StoreError> {
        let body_after = obj.to_body().map_err(StoreError::from)?;
        let status_after = obj.to_status().map_err(StoreError::from)?;

        let mut version = self.version;
        if let Some(diff) = merge::diff(&self.body_before, &body_after) {
            version = store
                .patch(
                    TICKET_CLUSTER_KIND,
                    &self.key,
                    PatchScope::Body,
                    &params(optimistic_lock, version),
                    &diff,
                )
                .await?;
        }
        if let Some(diff) = merge::diff(&self.status_before, &status_after) {
            store
                .patch(
                    TICKET_CLUSTER_KIND,
                    &self.key,
                    PatchScope::Status,
                    &params(optimistic_lock, version),
                    &diff,
                )
                .await?;
        }
        Ok(())
    }
}

fn params(optimistic_lock: bool, version: u64) -> PatchParams {
    if optimistic_lock {
        PatchParams::expecting(version)
    } else {
        PatchParams::default()
    }
}
