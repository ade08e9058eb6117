//! Health Server Error Types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("HTTP server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("HTTP server did not stop within {0:?}")]
    ShutdownTimeout(Duration),
}
