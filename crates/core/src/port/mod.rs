// Port Layer - Interfaces for external dependencies

pub mod connectivity_probe;
pub mod queue_client;

// Re-exports
pub use connectivity_probe::ConnectivityProbe;
pub use queue_client::QueueClient;
