use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::object::ObjectKey;

/// A versioned object as held by the store. The body (metadata + spec)
/// and the status are disjoint sub-resources patched independently.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    pub body: Value,
    pub status: Value,
    pub version: u64,
}

/// Which sub-resource a merge-patch targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchScope {
    Body,
    Status,
}

#[derive(Clone, Debug, Default)]
pub struct PatchParams {
    /// Optimistic-concurrency precondition: the patch is rejected with
    /// `StoreError::Conflict` if the stored version differs.
    pub expected_version: Option<u64>,
}

impl PatchParams {
    pub fn expecting(version: u64) -> Self {
        Self {
            expected_version: Some(version),
        }
    }
}

/// Change notification emitted by the store, standing in for a watch
/// event: the kind and key of the object that was written or removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub kind: String,
    pub key: ObjectKey,
}

/// The desired-state store consumed by reconcilers. Readers receive
/// deep copies; the only mutation primitive is an atomic merge-patch
/// scoped to one sub-resource.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one object. Absence is a legitimate outcome, not an error.
    async fn get(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<Option<ObjectRecord>, StoreError>;

    /// List all objects of a kind.
    async fn list(
        &self,
        kind: &str,
    ) -> Result<Vec<(ObjectKey, ObjectRecord)>, StoreError>;

    /// Atomically apply an RFC 7386 merge-patch to one sub-resource of
    /// an existing object. Returns the resulting version. A no-op patch
    /// leaves the version untouched and emits no trigger.
    async fn patch(
        &self,
        kind: &str,
        key: &ObjectKey,
        scope: PatchScope,
        params: &PatchParams,
        patch: &Value,
    ) -> Result<u64, StoreError>;

    /// Create an object. Fails with `Conflict` if the identity is taken.
    async fn insert(
        &self,
        kind: &str,
        key: &ObjectKey,
        body: Value,
        status: Value,
    ) -> Result<u64, StoreError>;

    /// Delete an object.
    async fn remove(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<(), StoreError>;
}
