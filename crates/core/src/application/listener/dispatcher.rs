// Dispatcher - semaphore-gated fan-out of inbound messages to handlers

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use super::acknowledgement::Acknowledgement;
use super::handler::MessageHandler;
use crate::domain::Message;
use crate::error::{ListenerError, Result};
use crate::port::QueueClient;

/// Pulls messages off the inbound channel and runs one handler task per message
///
/// At most `max_concurrent` handlers hold a dispatch slot at any time. Task
/// creation itself is not bounded, only throttled by the inbound channel.
pub struct Dispatcher {
    client: Arc<dyn QueueClient>,
    handler: Arc<dyn MessageHandler>,
    slots: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn QueueClient>,
        handler: Arc<dyn MessageHandler>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            client,
            handler,
            slots: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Free dispatch slots right now
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Dispatch messages in arrival order until the channel closes
    ///
    /// Per message:
    /// 1. wait for a dispatch slot
    /// 2. delete the message from the queue (before the handler runs)
    /// 3. spawn the handler with an Acknowledgement owning the slot
    ///
    /// Step 2 means a handler failure can never lead to redelivery: the queue
    /// has already forgotten the message. A failed delete is logged and the
    /// message is dispatched anyway.
    pub async fn run(&self, mut inbound: mpsc::Receiver<Message>) -> Result<()> {
        while let Some(message) = inbound.recv().await {
            let slot = self
                .slots
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ListenerError::Internal(format!("dispatch slots closed: {}", e)))?;

            if let Err(e) = self.client.delete(&message).await {
                warn!(
                    receipt_handle = %message.receipt_handle,
                    error = %e,
                    "Eager delete failed, dispatching anyway"
                );
            }

            debug!(
                receipt_handle = %message.receipt_handle,
                free_slots = self.slots.available_permits(),
                "Dispatching message"
            );

            let ack = Acknowledgement::new(Arc::clone(&self.client), message.clone(), slot);
            let handler = Arc::clone(&self.handler);
            tokio::spawn(async move {
                handler.handle(message, ack).await;
            });
        }

        Err(ListenerError::Internal(
            "inbound channel closed, poller is gone".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::queue_client::mocks::InMemoryQueue;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Handler that parks every acknowledgement until released by the test
    #[derive(Default)]
    struct ParkingHandler {
        parked: Mutex<Vec<Acknowledgement>>,
        seen: Mutex<Vec<String>>,
    }

    impl ParkingHandler {
        fn parked(&self) -> usize {
            self.parked.lock().unwrap().len()
        }

        fn take_parked(&self) -> Vec<Acknowledgement> {
            std::mem::take(&mut *self.parked.lock().unwrap())
        }
    }

    #[async_trait]
    impl MessageHandler for ParkingHandler {
        async fn handle(&self, message: Message, ack: Acknowledgement) {
            self.seen.lock().unwrap().push(message.body.clone());
            self.parked.lock().unwrap().push(ack);
        }
    }

    async fn received(queue: &InMemoryQueue, count: usize) -> Vec<Message> {
        for i in 0..count {
            queue.send(format!("m{}", i));
        }
        queue.receive(count as i32, 0).await.unwrap()
    }

    #[tokio::test]
    async fn test_slots_cap_running_handlers() {
        let queue = Arc::new(InMemoryQueue::new());
        let handler = Arc::new(ParkingHandler::default());
        let dispatcher = Arc::new(Dispatcher::new(queue.clone(), handler.clone(), 2));

        let (tx, rx) = mpsc::channel(8);
        for message in received(&queue, 3).await {
            tx.send(message).await.unwrap();
        }
        let run = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.run(rx).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.parked(), 2);
        assert_eq!(dispatcher.available_slots(), 0);
        // Third message is waiting for a slot, so it has not been deleted yet
        assert_eq!(queue.deleted().len(), 2);

        for ack in handler.take_parked() {
            ack.acknowledge().await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.parked(), 1);
        assert_eq!(queue.deleted().len(), 3);

        run.abort();
    }

    #[tokio::test]
    async fn test_message_deleted_before_handler_runs() {
        let queue = Arc::new(InMemoryQueue::new());

        struct CheckingHandler {
            queue: Arc<InMemoryQueue>,
            deleted_on_entry: Mutex<Option<bool>>,
        }

        #[async_trait]
        impl MessageHandler for CheckingHandler {
            async fn handle(&self, message: Message, ack: Acknowledgement) {
                *self.deleted_on_entry.lock().unwrap() =
                    Some(self.queue.is_deleted(&message.receipt_handle));
                ack.acknowledge().await;
            }
        }

        let handler = Arc::new(CheckingHandler {
            queue: queue.clone(),
            deleted_on_entry: Mutex::new(None),
        });
        let dispatcher = Dispatcher::new(queue.clone(), handler.clone(), 1);

        let (tx, rx) = mpsc::channel(1);
        tx.send(received(&queue, 1).await.remove(0)).await.unwrap();
        drop(tx);

        let result = dispatcher.run(rx).await;
        assert!(matches!(result, Err(ListenerError::Internal(_))));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*handler.deleted_on_entry.lock().unwrap(), Some(true));
        assert_eq!(queue.delete_calls(), 2);
        assert_eq!(queue.deleted().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_order_follows_channel() {
        let queue = Arc::new(InMemoryQueue::new());
        let handler = Arc::new(ParkingHandler::default());
        let dispatcher = Dispatcher::new(queue.clone(), handler.clone(), 4);

        let (tx, rx) = mpsc::channel(4);
        let messages = received(&queue, 4).await;
        let expected: Vec<String> = messages.iter().map(|m| m.receipt_handle.clone()).collect();
        for message in messages {
            tx.send(message).await.unwrap();
        }
        drop(tx);

        let _ = dispatcher.run(rx).await;
        assert_eq!(queue.deleted(), expected);
    }
}
