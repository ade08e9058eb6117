// Listener - Poll / dispatch / acknowledge engine

mod acknowledgement;
pub mod constants;
mod dispatcher;
mod handler;
mod poller;

pub use acknowledgement::Acknowledgement;
pub use dispatcher::Dispatcher;
pub use handler::{LoggingMessageHandler, MessageHandler};
pub use poller::Poller;

use constants::INBOUND_CHANNEL_CAPACITY;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::domain::QueueConfig;
use crate::error::Result;
use crate::port::QueueClient;

/// Consumes a queue: one poller task feeding one dispatcher loop
pub struct Listener {
    client: Arc<dyn QueueClient>,
    handler: Arc<dyn MessageHandler>,
    config: QueueConfig,
}

impl Listener {
    pub fn new(
        client: Arc<dyn QueueClient>,
        handler: Arc<dyn MessageHandler>,
        config: QueueConfig,
    ) -> Self {
        Self {
            client,
            handler,
            config,
        }
    }

    /// Start consuming
    ///
    /// Allocates the inbound channel and the dispatch slots, spawns the
    /// poller, then runs the dispatcher on the calling task. Does not return
    /// while the connection is alive; an `Err` means the poller went away.
    pub async fn establish_connection(self) -> Result<()> {
        self.config.validate()?;

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.client),
            self.handler,
            self.config.max_concurrent,
        );

        tokio::spawn(Poller::new(self.client, inbound_tx).run());

        info!(
            queue_url = %self.config.queue_url,
            region = %self.config.region,
            max_concurrent = self.config.max_concurrent,
            "Connection to queue is established, listening to messages..."
        );

        dispatcher.run(inbound_rx).await
    }
}
