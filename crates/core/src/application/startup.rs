// Startup connectivity retry
use crate::application::listener::constants::{DB_CONNECT_INTERVAL, DB_CONNECT_MAX_ATTEMPTS};
use crate::error::{ListenerError, Result};
use crate::port::ConnectivityProbe;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Fixed-interval retry around a ConnectivityProbe
///
/// Runs before the listener starts. There is no backoff: attempts are spaced
/// by a constant interval, and exhausting them is fatal for startup.
#[derive(Debug, Clone)]
pub struct StartupRetry {
    max_attempts: u32,
    interval: Duration,
}

impl Default for StartupRetry {
    fn default() -> Self {
        Self::new(DB_CONNECT_MAX_ATTEMPTS, DB_CONNECT_INTERVAL)
    }
}

impl StartupRetry {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Pings before giving up (at least 1 is made)
    /// * `interval` - Pause between two pings
    ///
    /// # Example
    /// ```text
    /// let retry = StartupRetry::new(10, Duration::from_secs(1));
    /// ```
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Ping until the probe answers or attempts run out
    ///
    /// Returns the attempt number that succeeded.
    ///
    /// # Errors
    /// - ListenerError::Connectivity carrying the last probe error once every
    ///   attempt failed
    pub async fn wait_until_reachable(&self, probe: &dyn ConnectivityProbe) -> Result<u32> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match probe.ping().await {
                Ok(()) => {
                    info!(attempt, max_attempts = self.max_attempts, "Database is reachable");
                    return Ok(attempt);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Database ping failed"
                    );
                    last_error = Some(e);
                }
            }

            if attempt < self.max_attempts {
                sleep(self.interval).await;
            }
        }

        Err(ListenerError::Connectivity(format!(
            "database unreachable after {} attempts: {}",
            self.max_attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}
