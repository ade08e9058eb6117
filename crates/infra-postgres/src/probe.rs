// PostgreSQL ConnectivityProbe Implementation

use async_trait::async_trait;
use sqlx::PgPool;
use sqs_listener_core::port::ConnectivityProbe;
use sqs_listener_core::{ListenerError, Result};
use tracing::debug;

use crate::connection::{create_pool, DatabaseConfig};

/// Pings PostgreSQL with `SELECT 1`
///
/// The pool lives as long as the probe, so a successful startup check leaves
/// a warm connection behind.
#[derive(Clone)]
pub struct PgConnectivityProbe {
    pool: PgPool,
}

impl PgConnectivityProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        debug!(host = %config.host, port = config.port, db = %config.name, "Creating database pool");
        Self::new(create_pool(config))
    }
}

fn map_sqlx_error(err: sqlx::Error) -> ListenerError {
    match &err {
        sqlx::Error::Database(db_err) => ListenerError::Connectivity(format!(
            "Database error [{}]: {}",
            db_err.code().as_deref().unwrap_or("?"),
            db_err.message()
        )),
        sqlx::Error::PoolTimedOut => {
            ListenerError::Connectivity("Timed out acquiring a database connection".to_string())
        }
        _ => ListenerError::Connectivity(format!("Database unreachable: {}", err)),
    }
}

#[async_trait]
impl ConnectivityProbe for PgConnectivityProbe {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
