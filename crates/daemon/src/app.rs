//! Startup sequence and process lifetime
//!
//! Order: database check, health server, queue connection, listener. The
//! process then waits for a shutdown signal and drains the health server.

use anyhow::{Context, Result};
use sqs_listener_api_http::{HealthServer, HealthServerConfig};
use sqs_listener_core::application::listener::constants::SHUTDOWN_GRACE_PERIOD;
use sqs_listener_core::application::{Listener, MessageHandler, StartupRetry};
use sqs_listener_core::domain::QueueConfig;
use sqs_listener_core::port::{ConnectivityProbe, QueueClient};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Wired collaborators, ready to run
pub struct App {
    pub probe: Arc<dyn ConnectivityProbe>,
    pub retry: StartupRetry,
    pub health: HealthServerConfig,
    pub queue: QueueConfig,
    pub handler: Arc<dyn MessageHandler>,
    pub shutdown_grace: Duration,
}

impl App {
    pub fn new(
        probe: Arc<dyn ConnectivityProbe>,
        retry: StartupRetry,
        health: HealthServerConfig,
        queue: QueueConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            probe,
            retry,
            health,
            queue,
            handler,
            shutdown_grace: SHUTDOWN_GRACE_PERIOD,
        }
    }

    /// Run until `shutdown` resolves
    ///
    /// `connect_queue` is only called once the database answered and the
    /// health server is up.
    ///
    /// # Errors
    /// - database unreachable after every attempt (nothing else started)
    /// - health server bind failure
    /// - queue connection failure (health server is stopped first)
    /// - listener exit before shutdown
    pub async fn run<C, Fut, S>(self, connect_queue: C, shutdown: S) -> Result<()>
    where
        C: FnOnce(QueueConfig) -> Fut,
        Fut: Future<Output = sqs_listener_core::Result<Arc<dyn QueueClient>>>,
        S: Future<Output = ()>,
    {
        let attempts = self
            .retry
            .wait_until_reachable(self.probe.as_ref())
            .await
            .context("Database connectivity check failed")?;
        info!(attempts, "Database connection established");

        let (addr, server) = HealthServer::start(self.health)
            .await
            .context("Health server start failed")?;
        info!(addr = %addr, "Health endpoints ready");

        let client = match connect_queue(self.queue.clone()).await {
            Ok(client) => client,
            Err(e) => {
                if let Err(stop_err) = server.shutdown(self.shutdown_grace).await {
                    error!(error = %stop_err, "Health server shutdown failed");
                }
                return Err(e).context("Queue connection failed");
            }
        };

        let listener = Listener::new(client, self.handler, self.queue);
        let mut listener_task = tokio::spawn(listener.establish_connection());

        let listener_failure = tokio::select! {
            _ = shutdown => {
                info!("Shutdown signal received");
                None
            }
            joined = &mut listener_task => {
                let reason = match joined {
                    Ok(Ok(())) => "listener stopped".to_string(),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) => e.to_string(),
                };
                error!(reason = %reason, "Listener exited unexpectedly");
                Some(reason)
            }
        };

        let stopped = server.shutdown(self.shutdown_grace).await;
        listener_task.abort();

        if let Some(reason) = listener_failure {
            anyhow::bail!("Listener exited: {}", reason);
        }
        stopped.context("Server forced to shutdown")?;

        info!("Bye");
        Ok(())
    }
}
