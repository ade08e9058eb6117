// Central Error Type for the Listener

use thiserror::Error;

/// Listener-level error type
///
/// Startup errors (`Connectivity`, `Config`) are fatal for the daemon.
/// Steady-state errors (`Transient`, payload errors) are logged and swallowed
/// by the poll loop and the handlers.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Transient queue error: {0}")]
    Transient(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ListenerError {
    /// Whether the poll loop may keep going after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, ListenerError::Transient(_))
    }
}

/// Result type alias using ListenerError
pub type Result<T> = std::result::Result<T, ListenerError>;

// Note: aws-sdk-sqs and sqlx errors are mapped in the adapter crates
// (orphan rules prevent From impls for foreign error types here)
