//! Health HTTP Server
//!
//! Runs the router on its own task so the listener engine never waits on it.

use crate::error::HealthServerError;
use crate::routes::router;
use sqs_listener_core::application::{shutdown_channel, ShutdownSender};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const DEFAULT_HOST: &str = "0.0.0.0";

/// Health Server Configuration
#[derive(Debug, Clone)]
pub struct HealthServerConfig {
    pub host: String,
    /// 0 binds an ephemeral port
    pub port: u16,
    pub version: String,
}

impl HealthServerConfig {
    pub fn new(port: u16) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port,
            version: sqs_listener_core::VERSION.to_string(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Health Server
pub struct HealthServer;

impl HealthServer {
    /// Bind and start serving in the background
    ///
    /// Returns the bound address (useful with port 0) and a handle that stops
    /// the server.
    ///
    /// # Errors
    /// - HealthServerError::Bind if the address is taken or invalid
    pub async fn start(
        config: HealthServerConfig,
    ) -> Result<(SocketAddr, HealthServerHandle), HealthServerError> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| HealthServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| HealthServerError::Bind { addr, source })?;

        let (sender, token) = shutdown_channel();
        let app = router(config.version);

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled())
                .await
        });

        info!(addr = %local_addr, "Health server listening");

        Ok((local_addr, HealthServerHandle { sender, task }))
    }
}

/// Handle to a running health server
pub struct HealthServerHandle {
    sender: ShutdownSender,
    task: JoinHandle<std::io::Result<()>>,
}

impl HealthServerHandle {
    /// Stop accepting connections and wait for in-flight requests
    ///
    /// The server task is aborted when `grace` elapses first.
    ///
    /// # Errors
    /// - HealthServerError::ShutdownTimeout if draining took longer than `grace`
    /// - HealthServerError::Serve / Join if the server had already failed
    pub async fn shutdown(self, grace: Duration) -> Result<(), HealthServerError> {
        let HealthServerHandle { sender, mut task } = self;
        sender.shutdown();

        match tokio::time::timeout(grace, &mut task).await {
            Ok(joined) => {
                joined?.map_err(HealthServerError::Serve)?;
                info!("Health server stopped");
                Ok(())
            }
            Err(_) => {
                warn!(grace = ?grace, "Health server did not drain in time, aborting");
                task.abort();
                Err(HealthServerError::ShutdownTimeout(grace))
            }
        }
    }
}
