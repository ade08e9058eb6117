//! Environment configuration
//!
//! Read once at startup. A `.env` file in the working directory is loaded
//! first when present; real environment variables win over it.

use config::{Config, Environment};
use serde::Deserialize;
use sqs_listener_api_http::HealthServerConfig;
use sqs_listener_core::application::listener::constants::{
    DB_CONNECT_INTERVAL, DB_CONNECT_MAX_ATTEMPTS, DEFAULT_MAX_CONCURRENT,
};
use sqs_listener_core::application::StartupRetry;
use sqs_listener_core::domain::QueueConfig;
use sqs_listener_core::{ListenerError, Result};
use sqs_listener_infra_postgres::DatabaseConfig;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_connect_attempts() -> u32 {
    DB_CONNECT_MAX_ATTEMPTS
}

fn default_connect_interval_ms() -> u64 {
    DB_CONNECT_INTERVAL.as_millis() as u64
}

/// Error worth reporting from a `.env` load; a missing file is the normal case
fn dotenv_failure(result: dotenvy::Result<PathBuf>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

/// Process configuration, one field per environment key (lowercased)
#[derive(Clone, Deserialize)]
pub struct EnvConfig {
    /// `PORT`: health server port
    pub port: u16,
    /// `REGION`
    pub region: String,
    pub aws_sqs_queue_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// `AWS_SQS_ENDPOINT`: endpoint override for local emulators
    #[serde(default)]
    pub aws_sqs_endpoint: Option<String>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_messages: usize,

    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_name: String,
    pub db_password: String,
    #[serde(default = "default_connect_attempts")]
    pub db_connect_attempts: u32,
    #[serde(default = "default_connect_interval_ms")]
    pub db_connect_interval_ms: u64,
}

impl EnvConfig {
    /// Load `.env` (if any) and read the process environment
    ///
    /// # Errors
    /// - ListenerError::Config naming the first missing or unparsable key
    pub fn load() -> Result<Self> {
        if let Some(e) = dotenv_failure(dotenvy::dotenv()) {
            warn!(error = %e, "Failed to load .env file");
        }
        Self::from_source(Environment::default())
    }

    /// Read from an explicit `Environment` source
    ///
    /// Values stay strings until serde asks for a number, so `DB_PASSWORD=007`
    /// is kept verbatim.
    pub fn from_source(source: Environment) -> Result<Self> {
        Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize::<EnvConfig>())
            .map_err(|e| ListenerError::Config(e.to_string()))
    }

    pub fn queue_config(&self) -> Result<QueueConfig> {
        let config = QueueConfig::new(
            self.aws_sqs_queue_url.clone(),
            self.region.clone(),
            self.max_concurrent_messages,
        )?;

        Ok(match &self.aws_sqs_endpoint {
            Some(endpoint) => config.with_endpoint_url(endpoint.clone()),
            None => config,
        })
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(
            self.db_host.clone(),
            self.db_port,
            self.db_user.clone(),
            self.db_name.clone(),
            self.db_password.clone(),
        )
    }

    pub fn startup_retry(&self) -> StartupRetry {
        StartupRetry::new(
            self.db_connect_attempts,
            Duration::from_millis(self.db_connect_interval_ms),
        )
    }

    pub fn health_config(&self) -> HealthServerConfig {
        HealthServerConfig::new(self.port)
    }
}

// Secrets stay out of logs
impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("port", &self.port)
            .field("region", &self.region)
            .field("aws_sqs_queue_url", &self.aws_sqs_queue_url)
            .field("aws_access_key_id", &"<redacted>")
            .field("aws_secret_access_key", &"<redacted>")
            .field("aws_sqs_endpoint", &self.aws_sqs_endpoint)
            .field("max_concurrent_messages", &self.max_concurrent_messages)
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_name", &self.db_name)
            .field("db_password", &"<redacted>")
            .field("db_connect_attempts", &self.db_connect_attempts)
            .field("db_connect_interval_ms", &self.db_connect_interval_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required() -> HashMap<String, String> {
        [
            ("PORT", "8080"),
            ("REGION", "eu-west-1"),
            ("AWS_SQS_QUEUE_URL", "http://localhost:4566/000000000000/jobs"),
            ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "topsecret"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
            ("DB_USER", "listener"),
            ("DB_NAME", "jobs"),
            ("DB_PASSWORD", "hunter2"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn load(vars: HashMap<String, String>) -> Result<EnvConfig> {
        EnvConfig::from_source(Environment::default().source(Some(vars)))
    }

    #[test]
    fn test_required_keys_with_defaults() {
        let config = load(required()).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.max_concurrent_messages, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.db_connect_attempts, 10);
        assert_eq!(config.db_connect_interval_ms, 1000);
        assert!(config.aws_sqs_endpoint.is_none());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut vars = required();
        vars.remove("DB_HOST");

        let err = load(vars).unwrap_err();
        assert!(matches!(err, ListenerError::Config(_)));
        assert!(err.to_string().contains("db_host"));
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let mut vars = required();
        vars.insert("PORT".to_string(), "eighty".to_string());

        assert!(matches!(load(vars), Err(ListenerError::Config(_))));
    }

    #[test]
    fn test_string_values_are_kept_verbatim() {
        for (password, name) in [("007", "TRUE"), ("0123", "1.50"), ("1e3", "false")] {
            let mut vars = required();
            vars.insert("DB_PASSWORD".to_string(), password.to_string());
            vars.insert("DB_NAME".to_string(), name.to_string());

            let config = load(vars).unwrap();
            assert_eq!(config.db_password, password);
            assert_eq!(config.db_name, name);
        }
    }

    #[test]
    fn test_missing_dotenv_is_not_reported() {
        let result = dotenvy::from_filename("no-such-dir/listener-test.env");
        assert!(dotenv_failure(result).is_none());
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        let path = std::env::temp_dir().join(format!("listener-bad-{}.env", std::process::id()));
        std::fs::write(&path, "=value-without-key\n").unwrap();

        let result = dotenvy::from_path(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(dotenv_failure(result.map(|()| path)).is_some());
    }

    #[test]
    fn test_projections() {
        let mut vars = required();
        vars.insert("AWS_SQS_ENDPOINT".to_string(), "http://localhost:4566".to_string());
        vars.insert("MAX_CONCURRENT_MESSAGES".to_string(), "5".to_string());
        vars.insert("DB_CONNECT_ATTEMPTS".to_string(), "3".to_string());
        let config = load(vars).unwrap();

        let queue = config.queue_config().unwrap();
        assert_eq!(queue.max_concurrent, 5);
        assert_eq!(queue.endpoint_url.as_deref(), Some("http://localhost:4566"));

        let db = config.database_config();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 5432);

        assert_eq!(config.startup_retry().max_attempts(), 3);
        assert_eq!(config.health_config().port, 8080);
    }

    #[test]
    fn test_zero_concurrency_rejected_by_queue_config() {
        let mut vars = required();
        vars.insert("MAX_CONCURRENT_MESSAGES".to_string(), "0".to_string());

        assert!(load(vars).unwrap().queue_config().is_err());

        let mut vars = required();
        vars.insert("MAX_CONCURRENT_MESSAGES".to_string(), usize::MAX.to_string());
        assert!(load(vars).unwrap().queue_config().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", load(required()).unwrap());
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("AKIAEXAMPLE"));
    }
}
