// Domain Layer - Messages, payloads and queue configuration

pub mod error;
pub mod message;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use message::{Message, MessageData, QueueMessage, ReceiptHandle};
pub use queue::QueueConfig;
