//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use parlo_observe::tracing_setup::{init_tracing, TracingOptions};
//!
//! // Human-readable structured logging only
//! init_tracing(&TracingOptions::default()).unwrap();
//!
//! // JSON lines plus OpenTelemetry export to stdout (local development)
//! init_tracing(&TracingOptions { json: true, otel_stdout: true }).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use std::sync::OnceLock;

/// Filter applied when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,parlo_core=debug";

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Output selection for [`init_tracing`].
#[derive(Debug, Clone, Default)]
pub struct TracingOptions {
    /// Emit one JSON object per event instead of the human-readable format.
    pub json: bool,
    /// Bridge tracing spans to OpenTelemetry with a stdout exporter.
    /// Suitable for local development; swap the exporter for OTLP in
    /// production.
    pub otel_stdout: bool,
}

/// Initialize the global tracing subscriber.
///
/// Installs a `fmt` layer (plain or JSON per [`TracingOptions::json`]) with
/// target visibility and span close timing, filtered by `RUST_LOG` when set
/// and by [`DEFAULT_FILTER`] otherwise.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing(options: &TracingOptions) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = if options.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(fmt_layer);

    if options.otel_stdout {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("parlo");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        // Store the provider for shutdown and register it globally.
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        registry.with(otel_layer).try_init()?;
    } else {
        registry.try_init()?;
    }

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Call this before process exit to ensure all buffered spans are exported.
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the global subscriber can only be installed once per
    // process.
    #[test]
    fn test_init_is_exclusive_and_shutdown_is_safe() {
        init_tracing(&TracingOptions { json: true, otel_stdout: false })
            .expect("first init installs the subscriber");
        tracing::info!(component = "tracing_setup", "subscriber installed");

        let second = init_tracing(&TracingOptions::default());
        assert!(second.is_err(), "second init must report the existing subscriber");

        // No OTel provider was registered, so this is a no-op.
        shutdown_tracing();
    }
}
