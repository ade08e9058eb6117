//! SQS Listener - Main Entry Point
//! Health server + queue listener, stopped by SIGINT/SIGTERM

mod app;
mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use app::App;
use config::EnvConfig;
use sqs_listener_core::application::LoggingMessageHandler;
use sqs_listener_core::port::QueueClient;
use sqs_listener_core::VERSION;
use sqs_listener_infra_postgres::PgConnectivityProbe;
use sqs_listener_infra_sqs::SqsQueueClient;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format =
        std::env::var("SQS_LISTENER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn,sqs_listener=info"))
        .context("Failed to create env filter")?;

    // 1.1. OpenTelemetry layer (optional)
    let (otel_layer, telemetry_guard) = match telemetry::init_telemetry() {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("Failed to initialize OpenTelemetry (continuing without it): {e:#}");
            (None, telemetry::TelemetryGuard::default())
        }
    };

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(otel_layer)
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(otel_layer)
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("SQS Listener v{} starting...", VERSION);
    if telemetry_guard.is_enabled() {
        info!("OpenTelemetry export enabled");
    }

    // 2. Load configuration
    let env = EnvConfig::load().context("Couldn't load env variables")?;
    let queue_config = env.queue_config()?;
    let database_config = env.database_config();
    info!(
        db_host = %database_config.host,
        db_port = database_config.port,
        queue_url = %queue_config.queue_url,
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let probe = Arc::new(PgConnectivityProbe::from_config(&database_config));
    let handler = Arc::new(LoggingMessageHandler::new());

    let app = App::new(
        probe,
        env.startup_retry(),
        env.health_config(),
        queue_config,
        handler,
    );

    // 4. Run until SIGINT/SIGTERM
    let result = app
        .run(
            |config| async move {
                SqsQueueClient::connect(&config)
                    .await
                    .map(|client| Arc::new(client) as Arc<dyn QueueClient>)
            },
            shutdown_signal(),
        )
        .await;

    telemetry_guard.shutdown();
    result
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
