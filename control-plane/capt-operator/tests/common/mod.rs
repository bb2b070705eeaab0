#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use capt_store::{
    MemoryStore, ObjectKey, ObjectRecord, ObjectStore, OwnerRef,
    PatchParams, PatchScope, StoreError,
};
use serde_json::Value;

use capt_operator::api::{
    CLUSTER_KIND, Cluster, TICKET_CLUSTER_KIND, TicketCluster,
    TicketClusterSpec,
};
use capt_operator::dispatch::{Dispatch, DispatchError, DispatchRequest};

/// Dispatch fake: records every request and hands back a fixed token.
pub struct RecordingDispatch {
    token: String,
    pub calls: Mutex<Vec<DispatchRequest>>,
}

impl RecordingDispatch {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Dispatch for RecordingDispatch {
    async fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<String, DispatchError> {
        self.calls.lock().unwrap().push(request.clone());
        Ok(self.token.clone())
    }
}

/// Dispatch fake that fails a configured number of times, then behaves
/// like [`RecordingDispatch`].
pub struct FlakyDispatch {
    failures_left: AtomicUsize,
    pub attempts: AtomicUsize,
    token: String,
}

impl FlakyDispatch {
    pub fn failing(times: usize, token: impl Into<String>) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            attempts: AtomicUsize::new(0),
            token: token.into(),
        }
    }
}

#[async_trait]
impl Dispatch for FlakyDispatch {
    async fn dispatch(
        &self,
        _request: &DispatchRequest,
    ) -> Result<String, DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
        {
            return Err(DispatchError::Unavailable(
                "backend offline".into(),
            ));
        }
        Ok(self.token.clone())
    }
}

/// Store wrapper that records every patch sent downstream, so tests can
/// assert patch minimality.
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub patches: Mutex<Vec<(String, PatchScope, Value)>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            patches: Mutex::new(Vec::new()),
        }
    }

    pub fn patch_count(&self) -> usize {
        self.patches.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn get(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        self.inner.get(kind, key).await
    }

    async fn list(
        &self,
        kind: &str,
    ) -> Result<Vec<(ObjectKey, ObjectRecord)>, StoreError> {
        self.inner.list(kind).await
    }

    async fn patch(
        &self,
        kind: &str,
        key: &ObjectKey,
        scope: PatchScope,
        params: &PatchParams,
        patch: &Value,
    ) -> Result<u64, StoreError> {
        self.patches.lock().unwrap().push((
            kind.to_string(),
            scope,
            patch.clone(),
        ));
        self.inner.patch(kind, key, scope, params, patch).await
    }

    async fn insert(
        &self,
        kind: &str,
        key: &ObjectKey,
        body: Value,
        status: Value,
    ) -> Result<u64, StoreError> {
        self.inner.insert(kind, key, body, status).await
    }

    async fn remove(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<(), StoreError> {
        self.inner.remove(kind, key).await
    }
}

/// Store wrapper whose patch path always conflicts, simulating the
/// commit window after a successful dispatch.
pub struct ConflictOnPatchStore {
    pub inner: MemoryStore,
}

impl ConflictOnPatchStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
        }
    }
}

#[async_trait]
impl ObjectStore for ConflictOnPatchStore {
    async fn get(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        self.inner.get(kind, key).await
    }

    async fn list(
        &self,
        kind: &str,
    ) -> Result<Vec<(ObjectKey, ObjectRecord)>, StoreError> {
        self.inner.list(kind).await
    }

    async fn patch(
        &self,
        kind: &str,
        key: &ObjectKey,
        _scope: PatchScope,
        _params: &PatchParams,
        _patch: &Value,
    ) -> Result<u64, StoreError> {
        Err(StoreError::Conflict(format!(
            "{kind} {key}: concurrent modification"
        )))
    }

    async fn insert(
        &self,
        kind: &str,
        key: &ObjectKey,
        body: Value,
        status: Value,
    ) -> Result<u64, StoreError> {
        self.inner.insert(kind, key, body, status).await
    }

    async fn remove(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<(), StoreError> {
        self.inner.remove(kind, key).await
    }
}

pub fn owned_ticket_cluster(
    namespace: &str,
    name: &str,
    owner: &str,
) -> TicketCluster {
    let mut tc = TicketCluster::new(
        namespace,
        name,
        TicketClusterSpec {
            request: "3 worker nodes".into(),
            ..Default::default()
        },
    );
    tc.metadata.owner_ref = Some(OwnerRef {
        kind: CLUSTER_KIND.into(),
        name: owner.into(),
    });
    tc
}

pub async fn insert_cluster(store: &dyn ObjectStore, cluster: &Cluster) {
    store
        .insert(
            CLUSTER_KIND,
            &cluster.key(),
            cluster.to_body().unwrap(),
            Value::Null,
        )
        .await
        .expect("insert cluster");
}

pub async fn insert_ticket(
    store: &dyn ObjectStore,
    tc: &TicketCluster,
) -> u64 {
    store
        .insert(
            TICKET_CLUSTER_KIND,
            &tc.key(),
            tc.to_body().unwrap(),
            tc.to_status().unwrap(),
        )
        .await
        .expect("insert ticket cluster")
}

pub async fn fetch_ticket(
    store: &dyn ObjectStore,
    key: &ObjectKey,
) -> TicketCluster {
    let record = store
        .get(TICKET_CLUSTER_KIND, key)
        .await
        .expect("get ticket cluster")
        .expect("ticket cluster exists");
    TicketCluster::from_record(&record).expect("parse ticket cluster")
}

/// Poll until the ticket cluster's message id is recorded, or time out.
pub async fn wait_for_message_id(
    store: &dyn ObjectStore,
    key: &ObjectKey,
    timeout: Duration,
) -> Option<String> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(Some(record)) = store.get(TICKET_CLUSTER_KIND, key).await {
            if let Ok(tc) = TicketCluster::from_record(&record) {
                if tc.status.message_id.is_some() {
                    return tc.status.message_id;
                }
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
