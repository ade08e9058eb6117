// Acknowledgement token handed to each handler invocation

use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, warn};

use crate::domain::Message;
use crate::port::QueueClient;

/// Completion signal for one dispatched message
///
/// Owns the dispatch slot (semaphore permit) taken for the message. Calling
/// [`Acknowledgement::acknowledge`] consumes the token, so a slot can be
/// released at most once. Dropping the token without acknowledging (handler
/// returned early, or panicked) also releases the slot, but skips the delete.
pub struct Acknowledgement {
    client: Arc<dyn QueueClient>,
    message: Message,
    slot: Option<OwnedSemaphorePermit>,
}

impl Acknowledgement {
    pub(crate) fn new(
        client: Arc<dyn QueueClient>,
        message: Message,
        slot: OwnedSemaphorePermit,
    ) -> Self {
        Self {
            client,
            message,
            slot: Some(slot),
        }
    }

    /// Delete the message (again) and release the dispatch slot
    ///
    /// The message was already deleted before the handler ran, so this
    /// delete is normally a no-op. A failure is logged, never returned: the
    /// slot is released either way.
    pub async fn acknowledge(mut self) {
        if let Err(e) = self.client.delete(&self.message).await {
            warn!(
                receipt_handle = %self.message.receipt_handle,
                error = %e,
                "Acknowledge delete failed"
            );
        }
        drop(self.slot.take());
        debug!(
            receipt_handle = %self.message.receipt_handle,
            "Message is processed and acknowledged"
        );
    }
}

impl Drop for Acknowledgement {
    fn drop(&mut self) {
        if self.slot.is_some() {
            warn!(
                receipt_handle = %self.message.receipt_handle,
                "Handler finished without acknowledging, releasing dispatch slot"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::queue_client::mocks::InMemoryQueue;
    use tokio::sync::Semaphore;

    async fn received(queue: &InMemoryQueue) -> Message {
        queue.send("{}");
        queue.receive(1, 0).await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_acknowledge_deletes_and_releases_slot() {
        let queue = Arc::new(InMemoryQueue::new());
        let message = received(&queue).await;
        let slots = Arc::new(Semaphore::new(1));
        let permit = slots.clone().acquire_owned().await.unwrap();
        assert_eq!(slots.available_permits(), 0);

        let ack = Acknowledgement::new(queue.clone(), message.clone(), permit);
        ack.acknowledge().await;

        assert_eq!(slots.available_permits(), 1);
        assert!(queue.is_deleted(&message.receipt_handle));
    }

    #[tokio::test]
    async fn test_acknowledge_after_eager_delete_is_noop() {
        let queue = Arc::new(InMemoryQueue::new());
        let message = received(&queue).await;
        queue.delete(&message).await.unwrap();

        let slots = Arc::new(Semaphore::new(1));
        let permit = slots.clone().acquire_owned().await.unwrap();
        Acknowledgement::new(queue.clone(), message.clone(), permit)
            .acknowledge()
            .await;

        assert_eq!(queue.delete_calls(), 2);
        assert_eq!(queue.deleted().len(), 1);
        assert_eq!(slots.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_drop_without_acknowledge_releases_slot() {
        let queue = Arc::new(InMemoryQueue::new());
        let message = received(&queue).await;
        let slots = Arc::new(Semaphore::new(1));
        let permit = slots.clone().acquire_owned().await.unwrap();

        let ack = Acknowledgement::new(queue.clone(), message, permit);
        drop(ack);

        assert_eq!(slots.available_permits(), 1);
        assert_eq!(queue.delete_calls(), 0);
    }
}
