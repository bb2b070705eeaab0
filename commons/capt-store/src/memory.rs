use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::merge;
use crate::object::ObjectKey;
use crate::store::{
    ObjectRecord, ObjectStore, PatchParams, PatchScope, Trigger,
};

/// In-memory implementation of [`ObjectStore`]. Every read hands out a
/// deep copy, so callers can never mutate stored state in place.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<(String, ObjectKey), ObjectRecord>>,
    subscribers: Mutex<Vec<flume::Sender<Trigger>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change-trigger subscription. Triggers are emitted for
    /// every successful insert, effective patch, and remove.
    pub fn subscribe(&self) -> flume::Receiver<Trigger> {
        let (tx, rx) = flume::unbounded();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    fn notify(&self, kind: &str, key: &ObjectKey) {
        let trigger = Trigger {
            kind: kind.to_string(),
            key: key.clone(),
        };
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(trigger.clone()).is_ok());
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<Option<ObjectRecord>, StoreError> {
        let objects = self
            .objects
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(objects.get(&(kind.to_string(), key.clone())).cloned())
    }

    async fn list(
        &self,
        kind: &str,
    ) -> Result<Vec<(ObjectKey, ObjectRecord)>, StoreError> {
        let objects = self
            .objects
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(objects
            .iter()
            .filter(|((k, _), _)| k == kind)
            .map(|((_, key), record)| (key.clone(), record.clone()))
            .collect())
    }

    async fn patch(
        &self,
        kind: &str,
        key: &ObjectKey,
        scope: PatchScope,
        params: &PatchParams,
        patch: &Value,
    ) -> Result<u64, StoreError> {
        let version = {
            let mut objects = self
                .objects
                .write()
                .map_err(|e| StoreError::Internal(e.to_string()))?;
            let record = objects
                .get_mut(&(kind.to_string(), key.clone()))
                .ok_or_else(|| {
                    StoreError::NotFound(format!("{kind} {key}"))
                })?;

            if let Some(expected) = params.expected_version {
                if record.version != expected {
                    return Err(StoreError::Conflict(format!(
                        "{kind} {key}: expected version {expected}, found {}",
                        record.version
                    )));
                }
            }

            let target = match scope {
                PatchScope::Body => &mut record.body,
                PatchScope::Status => &mut record.status,
            };
            let mut merged = target.clone();
            merge::apply(&mut merged, patch);
            if merged == *target {
                debug!(kind, %key, "merge-patch is a no-op");
                return Ok(record.version);
            }
            *target = merged;
            record.version += 1;
            record.version
        };
        self.notify(kind, key);
        Ok(version)
    }

    async fn insert(
        &self,
        kind: &str,
        key: &ObjectKey,
        body: Value,
        status: Value,
    ) -> Result<u64, StoreError> {
        {
            let mut objects = self
                .objects
                .write()
                .map_err(|e| StoreError::Internal(e.to_string()))?;
            let slot = (kind.to_string(), key.clone());
            if objects.contains_key(&slot) {
                return Err(StoreError::Conflict(format!(
                    "{kind} {key} already exists"
                )));
            }
            objects.insert(
                slot,
                ObjectRecord {
                    body,
                    status,
                    version: 1,
                },
            );
        }
        self.notify(kind, key);
        Ok(1)
    }

    async fn remove(
        &self,
        kind: &str,
        key: &ObjectKey,
    ) -> Result<(), StoreError> {
        {
            let mut objects = self
                .objects
                .write()
                .map_err(|e| StoreError::Internal(e.to_string()))?;
            objects
                .remove(&(kind.to_string(), key.clone()))
                .ok_or_else(|| {
                    StoreError::NotFound(format!("{kind} {key}"))
                })?;
        }
        self.notify(kind, key);
        Ok(())
    }
}
