//! Shared serialization plumbing for API types: an object's body is the
//! `{"metadata": .., "spec": ..}` document, its status lives in the
//! store's disjoint status sub-resource.

use capt_store::{ObjectMeta, ObjectRecord, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn body_of<S: Serialize>(
    metadata: &ObjectMeta,
    spec: &S,
) -> Result<Value, serde_json::Error> {
    Ok(serde_json::json!({
        "metadata": serde_json::to_value(metadata)?,
        "spec": serde_json::to_value(spec)?,
    }))
}

pub(crate) fn metadata_of(
    record: &ObjectRecord,
) -> Result<ObjectMeta, StoreError> {
    let value = record
        .body
        .get("metadata")
        .cloned()
        .unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn spec_of<S: DeserializeOwned + Default>(
    record: &ObjectRecord,
) -> Result<S, StoreError> {
    match record.body.get("spec") {
        Some(value) if !value.is_null() => {
            Ok(serde_json::from_value(value.clone())?)
        }
        _ => Ok(S::default()),
    }
}

pub(crate) fn status_of<S: DeserializeOwned + Default>(
    record: &ObjectRecord,
) -> Result<S, StoreError> {
    if record.status.is_null() {
        Ok(S::default())
    } else {
        Ok(serde_json::from_value(record.status.clone())?)
    }
}
