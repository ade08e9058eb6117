// SQS Listener Core - Poll/Dispatch/Acknowledge engine & Ports
// NO infrastructure dependencies (adapters live in infra-* crates)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{ListenerError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
