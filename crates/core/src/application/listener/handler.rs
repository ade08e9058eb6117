// Message handler contract + the default logging handler

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info};

use super::acknowledgement::Acknowledgement;
use crate::domain::{Message, QueueMessage};

/// Business logic invoked once per dispatched message
///
/// The message has already been deleted from the queue when `handle` runs.
/// Failures (including malformed payloads) must be handled here: the
/// listener provides no retry, timeout or supervision around handlers.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: Message, ack: Acknowledgement);
}

/// Decodes `QueueMessage` payloads and logs them
///
/// Malformed payloads are logged and skipped (the message is already gone
/// from the queue, so it is lost).
#[derive(Default)]
pub struct LoggingMessageHandler {
    processed: AtomicUsize,
    rejected: AtomicUsize,
}

impl LoggingMessageHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages decoded and acknowledged
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Messages dropped because their payload did not decode
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for LoggingMessageHandler {
    async fn handle(&self, message: Message, ack: Acknowledgement) {
        let payload = match QueueMessage::from_body(&message.body) {
            Ok(payload) => payload,
            Err(e) => {
                error!(
                    receipt_handle = %message.receipt_handle,
                    message_id = ?message.message_id,
                    error = %e,
                    "Failed to decode queue message"
                );
                self.rejected.fetch_add(1, Ordering::SeqCst);
                return;
            }
        };

        info!(
            id = %payload.data.id,
            created_at = %payload.data.created_at,
            "Received message: {}",
            payload.data.message
        );

        ack.acknowledge().await;
        self.processed.fetch_add(1, Ordering::SeqCst);
    }
}
