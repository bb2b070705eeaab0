use capt_store::{ObjectKey, ObjectMeta, ObjectRecord, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::object;

pub const TICKET_MACHINE_KIND: &str = "TicketMachine";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketMachineSpec {
    /// Requested machine flavor, forwarded to the fulfilment pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketMachineStatus {}

/// Machine counterpart of [`super::TicketCluster`]. Storable today; no
/// machine controller reconciles it yet.
#[derive(Clone, Debug, PartialEq)]
pub struct TicketMachine {
    pub metadata: ObjectMeta,
    pub spec: TicketMachineSpec,
    pub status: TicketMachineStatus,
}

impl TicketMachine {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        spec: TicketMachineSpec,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec,
            status: TicketMachineStatus::default(),
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
