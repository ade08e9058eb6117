// Queue Client Port (Interface)
// reason: async-trait so the engine can hold `Arc<dyn QueueClient>`
use async_trait::async_trait;

use crate::domain::Message;
use crate::error::Result;

/// Request/response access to the managed queue
///
/// Implementations:
/// - SqsQueueClient (infra-sqs): AWS SQS
/// - mocks::InMemoryQueue: test double
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Long-poll for up to `max_messages` messages
    ///
    /// Blocks server-side for at most `wait_seconds`. An empty vec means the
    /// wait elapsed with nothing available, it is not an error.
    ///
    /// # Errors
    /// - ListenerError::Transient on network or service failure (caller retries)
    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<Message>>;

    /// Remove a delivered message from the queue
    ///
    /// Idempotent: deleting a message that is already gone succeeds.
    async fn delete(&self, message: &Message) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ReceiptHandle;
    use crate::error::ListenerError;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use uuid::Uuid;

    #[derive(Default)]
    struct QueueState {
        visible: VecDeque<Message>,
        in_flight: HashMap<ReceiptHandle, Message>,
        deleted: Vec<ReceiptHandle>,
        receive_calls: usize,
        delete_calls: usize,
        receive_failures: usize,
    }

    impl QueueState {
        fn take_batch(&mut self, max_messages: usize) -> Vec<Message> {
            let count = max_messages.min(self.visible.len());
            let batch: Vec<Message> = self.visible.drain(..count).collect();
            for message in &batch {
                self.in_flight
                    .insert(message.receipt_handle.clone(), message.clone());
            }
            batch
        }
    }

    /// In-memory queue with SQS-like receive/delete semantics
    ///
    /// Received messages move to "in flight" until deleted. Deleting an
    /// unknown or already deleted receipt handle is a no-op, like SQS.
    #[derive(Default)]
    pub struct InMemoryQueue {
        state: Mutex<QueueState>,
        arrivals: Notify,
    }

    impl InMemoryQueue {
        pub fn new() -> Self {
            Self::default()
        }

        /// Publish a message, returning the receipt handle of its delivery
        pub fn send(&self, body: impl Into<String>) -> ReceiptHandle {
            let message = Message::new(Uuid::new_v4().to_string(), body)
                .with_message_id(Uuid::new_v4().to_string());
            let receipt_handle = message.receipt_handle.clone();
            self.state.lock().unwrap().visible.push_back(message);
            self.arrivals.notify_waiters();
            receipt_handle
        }

        /// Make the next `count` receive calls fail with a transient error
        pub fn fail_next_receives(&self, count: usize) {
            self.state.lock().unwrap().receive_failures = count;
        }

        pub fn receive_calls(&self) -> usize {
            self.state.lock().unwrap().receive_calls
        }

        pub fn delete_calls(&self) -> usize {
            self.state.lock().unwrap().delete_calls
        }

        /// Receipt handles actually removed from the queue, in deletion order
        pub fn deleted(&self) -> Vec<ReceiptHandle> {
            self.state.lock().unwrap().deleted.clone()
        }

        pub fn is_deleted(&self, receipt_handle: &str) -> bool {
            self.state
                .lock()
                .unwrap()
                .deleted
                .iter()
                .any(|h| h == receipt_handle)
        }

        pub fn visible_len(&self) -> usize {
            self.state.lock().unwrap().visible.len()
        }

        pub fn in_flight_len(&self) -> usize {
            self.state.lock().unwrap().in_flight.len()
        }
    }

    #[async_trait]
    impl QueueClient for InMemoryQueue {
        async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<Message>> {
            let max_messages = max_messages.max(1) as usize;
            // Registered before the state check so a concurrent send is not missed
            let arrived = self.arrivals.notified();
            {
                let mut state = self.state.lock().unwrap();
                state.receive_calls += 1;
                if state.receive_failures > 0 {
                    state.receive_failures -= 1;
                    return Err(ListenerError::Transient(
                        "injected receive failure".to_string(),
                    ));
                }
                if !state.visible.is_empty() {
                    return Ok(state.take_batch(max_messages));
                }
            }

            let wait = Duration::from_secs(wait_seconds.max(0) as u64);
            let _ = tokio::time::timeout(wait, arrived).await;

            Ok(self.state.lock().unwrap().take_batch(max_messages))
        }

        async fn delete(&self, message: &Message) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.delete_calls += 1;
            if state.in_flight.remove(&message.receipt_handle).is_some() {
                state.deleted.push(message.receipt_handle.clone());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::InMemoryQueue;
    use super::*;

    #[tokio::test]
    async fn test_in_memory_receive_respects_batch_size() {
        let queue = InMemoryQueue::new();
        for i in 0..5 {
            queue.send(format!("body-{}", i));
        }

        let batch = queue.receive(4, 0).await.unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch[0].body, "body-0");
        assert_eq!(queue.visible_len(), 1);
        assert_eq!(queue.in_flight_len(), 4);
    }

    #[tokio::test]
    async fn test_in_memory_receive_times_out_empty() {
        let queue = InMemoryQueue::new();
        let batch = queue.receive(4, 0).await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(queue.receive_calls(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_delete_is_idempotent() {
        let queue = InMemoryQueue::new();
        queue.send("payload");
        let message = queue.receive(1, 0).await.unwrap().remove(0);

        queue.delete(&message).await.unwrap();
        queue.delete(&message).await.unwrap();

        assert_eq!(queue.delete_calls(), 2);
        assert_eq!(queue.deleted(), vec![message.receipt_handle.clone()]);
        assert!(queue.is_deleted(&message.receipt_handle));
    }

    #[tokio::test]
    async fn test_in_memory_injected_failures() {
        let queue = InMemoryQueue::new();
        queue.send("payload");
        queue.fail_next_receives(2);

        assert!(queue.receive(1, 0).await.unwrap_err().is_transient());
        assert!(queue.receive(1, 0).await.is_err());
        assert_eq!(queue.receive(1, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_long_poll_wakes_on_send() {
        let queue = std::sync::Arc::new(InMemoryQueue::new());
        let poller = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.receive(4, 10).await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        queue.send("late arrival");

        let batch = tokio::time::timeout(std::time::Duration::from_secs(2), poller)
            .await
            .expect("long poll should wake on send")
            .unwrap()
            .unwrap();
        assert_eq!(batch.len(), 1);
    }
}
