//! Subscriber initialization with optional OTLP export (OpenTelemetry 0.31).

use once_cell::sync::OnceCell;
use opentelemetry::{global, trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::ObservabilityConfig;
use crate::error::ObservabilityError;

// Kept for flushing on shutdown
static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

fn env_filter(config: &ObservabilityConfig) -> Result<EnvFilter, ObservabilityError> {
    match &config.log_level {
        Some(level) => EnvFilter::try_new(level.as_str())
            .map_err(|e| ObservabilityError::Config(format!("invalid log filter '{}': {}", level, e))),
        None => Ok(EnvFilter::new("info")),
    }
}

/// Install the global subscriber.
///
/// Fails when the log filter does not parse or a global subscriber is
/// already installed. A broken OTLP endpoint only downgrades to console
/// logging.
pub fn init(config: ObservabilityConfig) -> Result<(), ObservabilityError> {
    let env_filter = env_filter(&config)?;

    let mut attributes = vec![KeyValue::new("service.name", config.service_name.clone())];
    if let Some(version) = &config.service_version {
        attributes.push(KeyValue::new("service.version", version.clone()));
    }
    let resource = Resource::builder().with_attributes(attributes).build();

    let fmt_layer = config.enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(false)
    });

    let mut otlp_status: Result<Option<String>, String> = Ok(None);
    let otel_layer = match &config.otlp_endpoint {
        Some(endpoint) => {
            match build_otlp_tracer_provider(&config.service_name, endpoint, resource) {
                Ok((tracer, provider)) => {
                    global::set_tracer_provider(provider.clone());
                    let _ = TRACER_PROVIDER.set(provider);
                    otlp_status = Ok(Some(endpoint.clone()));
                    Some(OpenTelemetryLayer::new(tracer))
                }
                Err(e) => {
                    otlp_status = Err(e.to_string());
                    None
                }
            }
        }
        None => None,
    };

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    // Reported after init so the messages reach the new subscriber.
    match otlp_status {
        Ok(Some(endpoint)) => tracing::info!(
            service.name = %config.service_name,
            otlp.endpoint = %endpoint,
            "OTLP tracing enabled"
        ),
        Ok(None) => tracing::debug!(
            service.name = %config.service_name,
            "Tracing initialized without OTLP export"
        ),
        Err(error) => tracing::warn!(
            service.name = %config.service_name,
            error = %error,
            "Failed to initialize OTLP export, logging to stderr only"
        ),
    }

    Ok(())
}

fn build_otlp_tracer_provider(
    service_name: &str,
    endpoint: &str,
    resource: Resource,
) -> Result<(opentelemetry_sdk::trace::SdkTracer, SdkTracerProvider), ObservabilityError> {
    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint.to_string())
        .build()
        .map_err(|e| ObservabilityError::InitFailed(e.to_string()))?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .with_resource(resource)
        .build();

    let tracer = provider.tracer(service_name.to_string());
    Ok((tracer, provider))
}

/// Flush and stop span export. No-op when OTLP was never enabled.
pub fn shutdown() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        let _ = provider.shutdown();
        tracing::debug!("OpenTelemetry tracer provider shut down");
    }
}

pub fn init_from_env() -> Result<(), ObservabilityError> {
    init(ObservabilityConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_config_error() {
        let config = ObservabilityConfig::new("test").with_log_level("codeask=notalevel");
        let err = env_filter(&config).unwrap_err();
        assert!(matches!(err, ObservabilityError::Config(_)));
    }

    #[test]
    fn test_missing_level_defaults_to_info() {
        assert!(env_filter(&ObservabilityConfig::default()).is_ok());
    }

    #[test]
    fn test_shutdown_without_provider_is_noop() {
        shutdown();
    }
}
