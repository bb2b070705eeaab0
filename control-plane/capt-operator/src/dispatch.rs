use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

/// Message handed to the fulfilment pipeline: one cluster request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("dispatch backend unavailable: {0}")]
    Unavailable(String),

    #[error("dispatch rejected: {0}")]
    Rejected(String),
}

/// The action producer. One call performs the externally visible side
/// effect and returns the message id that proves it happened. Backends
/// are expected to deduplicate on their side; the reconciler guarantees
/// at most one *recorded* dispatch per object lifetime.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<String, DispatchError>;
}

/// Dispatch backend that logs the request and fabricates a message id.
/// Stands in until a real ticketing/mail backend is wired up.
pub struct LogDispatch {
    recipient: String,
}

impl LogDispatch {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl Dispatch for LogDispatch {
    async fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<String, DispatchError> {
        let message_id = nanoid::nanoid!();
        info!(
            recipient = %self.recipient,
            subject = %request.subject,
            %message_id,
            "dispatching cluster request"
        );
        debug!(body = %request.body, "dispatch body");
        Ok(message_id)
    }
}
