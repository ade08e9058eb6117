// Queue Domain Model

use super::error::{DomainError, Result};
use tokio::sync::Semaphore;

/// Queue connection configuration
///
/// Immutable for the lifetime of a connection.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub queue_url: String,
    pub region: String,
    /// Upper bound on concurrently running handlers
    pub max_concurrent: usize,
    /// Endpoint override (local emulators); `None` uses the regional endpoint
    pub endpoint_url: Option<String>,
}

impl QueueConfig {
    pub fn new(
        queue_url: impl Into<String>,
        region: impl Into<String>,
        max_concurrent: usize,
    ) -> Result<Self> {
        let config = Self {
            queue_url: queue_url.into(),
            region: region.into(),
            max_concurrent,
            endpoint_url: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_url.trim().is_empty() {
            return Err(DomainError::InvalidConfig("queue url is empty".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(DomainError::InvalidConfig("region is empty".to_string()));
        }
        if self.max_concurrent == 0 {
            return Err(DomainError::InvalidConfig(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent > Semaphore::MAX_PERMITS {
            return Err(DomainError::InvalidConfig(format!(
                "max_concurrent must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(())
    }
}
