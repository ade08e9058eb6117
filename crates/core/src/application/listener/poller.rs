// Poller - long-poll loop feeding the inbound channel

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::constants::{RECEIVE_BATCH_SIZE, RECEIVE_WAIT_SECONDS};
use crate::domain::Message;
use crate::port::QueueClient;

/// Receives batches from the queue and pushes them into the inbound channel
///
/// `send` on the bounded channel waits while the dispatcher is behind, which
/// is the only thing keeping polling from running ahead of processing.
pub struct Poller {
    client: Arc<dyn QueueClient>,
    inbound: mpsc::Sender<Message>,
}

impl Poller {
    pub fn new(client: Arc<dyn QueueClient>, inbound: mpsc::Sender<Message>) -> Self {
        Self { client, inbound }
    }

    /// Poll until the inbound channel is closed
    ///
    /// Receive failures are logged and the next receive is issued right away
    /// (no backoff). No shutdown signal is observed: the loop only stops once
    /// the dispatcher side of the channel is gone, which also cancels a
    /// pending long poll.
    pub async fn run(self) {
        info!("Poller started, waiting for queue messages");
        loop {
            let received = tokio::select! {
                _ = self.inbound.closed() => {
                    info!("Inbound channel closed, poller stopped");
                    return;
                }
                received = self.client.receive(RECEIVE_BATCH_SIZE, RECEIVE_WAIT_SECONDS) => received,
            };

            let messages = match received {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(error = %e, "Failed to fetch queue messages");
                    continue;
                }
            };

            if messages.is_empty() {
                debug!("Long poll returned no messages");
                continue;
            }

            for message in messages {
                info!(
                    receipt_handle = %message.receipt_handle,
                    message_id = ?message.message_id,
                    "New message received from queue"
                );
                if self.inbound.send(message).await.is_err() {
                    info!("Inbound channel closed, poller stopped");
                    return;
                }
            }
        }
    }
}
