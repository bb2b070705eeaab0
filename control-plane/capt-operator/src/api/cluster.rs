use capt_store::{ObjectKey, ObjectMeta, ObjectRecord, StoreError};
use serde_json::Value;

use super::object;

pub const CLUSTER_KIND: &str = "Cluster";

/// The owner resource. This controller only ever reads it: identity for
/// the dispatch subject, annotations for the pause gate.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub metadata: ObjectMeta,
}

impl Cluster {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    pub fn from_record(record: &ObjectRecord) -> Result<Self, StoreError> {
        Ok(Self {
            metadata: object::metadata_of(record)?,
        })
    }

    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        Ok(serde_json::json!({
            "metadata": serde_json::to_value(&self.metadata)?,
        }))
    }
}
