use std::fmt;

use capt_store::{ObjectKey, ObjectMeta, ObjectRecord, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::object;

pub const TICKET_CLUSTER_KIND: &str = "TicketCluster";

/// Priority classifier carried in the dispatch subject line.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketClusterSpec {
    #[serde(default)]
    pub priority: Priority,
    /// Free-form description of the requested cluster, forwarded
    /// verbatim in the dispatch body.
    #[serde(default)]
    pub request: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketClusterStatus {
    /// Completion token: the message id returned by dispatch. Once set
    /// it is never cleared or overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// The child resource under reconciliation. A separate cluster
/// controller links it to its owning [`super::Cluster`] via
/// `metadata.owner_ref`.
#[derive(Clone, Debug, PartialEq)]
pub struct TicketCluster {
    pub metadata: ObjectMeta,
    pub spec: TicketClusterSpec,
    pub status: TicketClusterStatus,
}

impl TicketCluster {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        spec: TicketClusterSpec,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec,
            status: TicketClusterStatus::default(),
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    pub fn from_record(record: &ObjectRecord) -> Result<Self, StoreError> {
        Ok(Self {
            metadata: object::metadata_of(record)?,
            spec: object::spec_of(record)?,
            status: object::status_of(record)?,
        })
    }

    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        object::body_of(&self.metadata, &self.spec)
    }

    pub fn to_status(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capt_store::OwnerRef;
    use serde_json::json;

    #[test]
    fn record_round_trip() {
        let mut tc = TicketCluster::new(
            "default",
            "dev-1",
            TicketClusterSpec {
                priority: Priority::High,
                request: "3 nodes, please".into(),
            },
        );
        tc.metadata.owner_ref = Some(OwnerRef {
            kind: "Cluster".into(),
            name: "dev".into(),
        });
        tc.status.message_id = Some("m-42".into());

        let record = ObjectRecord {
            body: tc.to_body().unwrap(),
            status: tc.to_status().unwrap(),
            version: 1,
        };
        assert_eq!(TicketCluster::from_record(&record).unwrap(), tc);
    }

    #[test]
    fn defaults_fill_missing_spec_and_status() {
        let record = ObjectRecord {
            body: json!({"metadata": {"namespace": "default", "name": "bare"}}),
            status: Value::Null,
            version: 1,
        };
        let tc = TicketCluster::from_record(&record).unwrap();
        assert_eq!(tc.spec.priority, Priority::Normal);
        assert_eq!(tc.status.message_id, None);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Priority::High).unwrap(),
            json!("high")
        );
        assert_eq!(Priority::Low.to_string(), "low");
    }
}
