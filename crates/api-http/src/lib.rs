//! Health HTTP Layer
//!
//! Serves liveness (`GET /status`) and build version (`GET /version`) for the
//! listener daemon. Independent of the queue engine.

pub mod error;
pub mod routes;
pub mod server;

pub use error::HealthServerError;
pub use routes::{router, VersionResponse};
pub use server::{HealthServer, HealthServerConfig, HealthServerHandle};
