//! Telemetry setup for OpenTelemetry integration
//! Optional trace export next to the local log output

use anyhow::Result;
use tracing_subscriber::{Layer, Registry};

/// Extra subscriber layer exporting spans, when configured
pub type TelemetryLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the exporter alive; flush it with [`TelemetryGuard::shutdown`]
#[derive(Default)]
pub struct TelemetryGuard {
    #[cfg(feature = "telemetry")]
    provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
}

impl TelemetryGuard {
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "telemetry")]
        {
            self.provider.is_some()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            false
        }
    }

    /// Flush pending spans
    pub fn shutdown(self) {
        #[cfg(feature = "telemetry")]
        {
            if let Some(provider) = self.provider {
                if let Err(e) = provider.shutdown() {
                    tracing::warn!(error = %e, "Failed to flush OpenTelemetry spans");
                }
            }
        }
    }
}

/// Build the OpenTelemetry layer if enabled
///
/// Runs before the subscriber is installed, so it does not log; the caller
/// reports the outcome.
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: sqs-listener)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
/// OTEL_SERVICE_NAME=sqs-listener-staging \
///     ./sqs-listener
/// ```
pub fn init_telemetry() -> Result<(Option<TelemetryLayer>, TelemetryGuard)> {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok((None, TelemetryGuard::default()));
    };

    #[cfg(feature = "telemetry")]
    {
        init_telemetry_impl(endpoint)
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = endpoint;
        Ok((None, TelemetryGuard::default()))
    }
}

#[cfg(feature = "telemetry")]
fn init_telemetry_impl(endpoint: String) -> Result<(Option<TelemetryLayer>, TelemetryGuard)> {
    use opentelemetry::trace::TracerProvider;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::SdkTracerProvider;
    use opentelemetry_sdk::Resource;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "sqs-listener".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(service_name.clone()).build())
        .build();

    opentelemetry::global::set_tracer_provider(provider.clone());

    let layer = tracing_opentelemetry::layer().with_tracer(provider.tracer(service_name));

    Ok((
        Some(Box::new(layer)),
        TelemetryGuard {
            provider: Some(provider),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_guard_is_disabled() {
        let guard = TelemetryGuard::default();
        assert!(!guard.is_enabled());
        guard.shutdown();
    }
}
