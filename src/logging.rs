use anyhow::Result;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Collector endpoint; when unset spans only reach the stderr log
pub const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Spans exported to the collector regardless of `RUST_LOG`
const EXPORT_FILTER: &str = "secure_weather_mcp=info,weather_agent=info";

/// Flushes exported spans when dropped. Hold it until `main` returns
#[must_use]
pub struct LogGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to flush trace exporter: {e}");
            }
        }
    }
}

/// Installs the global subscriber.
///
/// Output goes to stderr: on the stdio transport stdout carries JSON-RPC frames.
/// Spans are also exported over OTLP/HTTP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn init(service_name: &'static str, default_filter: &str) -> Result<LogGuard> {
    let tracer_provider = if otlp_enabled(std::env::var(OTLP_ENDPOINT_VAR).ok().as_deref()) {
        Some(tracer_provider(service_name)?)
    } else {
        None
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()));

    let otel_layer = tracer_provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer()
            .with_tracer(provider.tracer(service_name))
            .with_filter(EnvFilter::new(EXPORT_FILTER))
    });

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    if tracer_provider.is_some() {
        tracing::info!(service = service_name, "Exporting traces over OTLP");
    }

    Ok(LogGuard { tracer_provider })
}

fn tracer_provider(service_name: &'static str) -> Result<SdkTracerProvider> {
    // endpoint and headers come from the standard OTEL_EXPORTER_OTLP_* variables
    let exporter = SpanExporter::builder().with_http().build()?;

    Ok(SdkTracerProvider::builder()
        .with_resource(Resource::builder().with_service_name(service_name).build())
        .with_batch_exporter(exporter)
        .build())
}

fn otlp_enabled(endpoint: Option<&str>) -> bool {
    endpoint.is_some_and(|e| !e.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_needs_a_non_blank_endpoint() {
        assert!(!otlp_enabled(None));
        assert!(!otlp_enabled(Some("")));
        assert!(!otlp_enabled(Some("  ")));
        assert!(otlp_enabled(Some("http://localhost:4318")));
    }
}
