// SQS QueueClient implementation
// reason: aws-sdk-sqs is the managed queue's official client

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client;
use sqs_listener_core::domain::{Message, QueueConfig};
use sqs_listener_core::port::QueueClient;
use sqs_listener_core::Result;
use tracing::{debug, info};

use crate::convert::{connectivity, into_domain, is_already_gone, transient};

/// QueueClient backed by AWS SQS
///
/// Credentials come from the SDK's default chain (`AWS_ACCESS_KEY_ID`,
/// `AWS_SECRET_ACCESS_KEY`, profiles, IMDS, ...).
#[derive(Clone, Debug)]
pub struct SqsQueueClient {
    client: Client,
    queue_url: String,
}

impl SqsQueueClient {
    /// Open a session for the configured region and check the queue answers
    ///
    /// # Errors
    /// - ListenerError::Connectivity if the queue cannot be reached with the
    ///   resolved endpoint and credentials. Not retried.
    pub async fn connect(config: &QueueConfig) -> Result<Self> {
        config.validate()?;

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        let client = Self::from_client(Client::new(&sdk_config), config.queue_url.clone());
        client.verify().await?;

        info!(
            queue_url = %client.queue_url,
            region = %config.region,
            "Connected to SQS queue"
        );
        Ok(client)
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    async fn verify(&self) -> Result<()> {
        self.client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await
            .map_err(|e| connectivity("Failed to reach SQS queue", e))?;
        Ok(())
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn receive(&self, max_messages: i32, wait_seconds: i32) -> Result<Vec<Message>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .map_err(|e| transient("Failed to fetch SQS messages", e))?;

        let messages: Vec<Message> = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(into_domain)
            .collect();

        debug!(count = messages.len(), "SQS receive completed");
        Ok(messages)
    }

    async fn delete(&self, message: &Message) -> Result<()> {
        let result = self
            .client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(&message.receipt_handle)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().is_some_and(is_already_gone) => {
                debug!(
                    receipt_handle = %message.receipt_handle,
                    "Message already deleted"
                );
                Ok(())
            }
            Err(e) => Err(transient("Failed to delete SQS message", e)),
        }
    }
}
