// Message Domain Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::Result;

/// Opaque token identifying one delivery of a message (needed for deletion)
pub type ReceiptHandle = String;

/// A message as delivered by the queue
///
/// `receipt_handle` is only used to delete this delivery, it carries no
/// business identity. The body is kept raw; decoding is the handler's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub receipt_handle: ReceiptHandle,
    pub message_id: Option<String>,
    pub body: String,
}

impl Message {
    pub fn new(receipt_handle: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            receipt_handle: receipt_handle.into(),
            message_id: None,
            body: body.into(),
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }
}

/// Business payload carried in the message body
///
/// Wire format: `{"data": {"id", "createdAt", "updatedAt", "message"}}`.
/// Unknown fields are ignored, missing ones are a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub data: MessageData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message: String,
}

impl QueueMessage {
    /// Decode a raw message body
    pub fn from_body(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Encode into a message body
    pub fn to_body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
