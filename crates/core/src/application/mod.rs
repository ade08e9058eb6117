// Application Layer - Listener engine, startup checks, shutdown signalling

pub mod listener;
pub mod shutdown;
pub mod startup;

// Re-exports
pub use listener::{Acknowledgement, Listener, LoggingMessageHandler, MessageHandler};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use startup::StartupRetry;
