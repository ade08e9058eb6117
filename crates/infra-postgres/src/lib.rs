// SQS Listener Infrastructure - PostgreSQL Adapter
// Implements: ConnectivityProbe

mod connection;
mod probe;

pub use connection::{create_pool, DatabaseConfig};
pub use probe::PgConnectivityProbe;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for ListenerError here)
