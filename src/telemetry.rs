//! Telemetry and structured logging for the conversion service.

use crate::config::{LogFormat, ServiceConfig};
use crate::job::{ConversionJob, JobStatus};
use opentelemetry::trace::{Span, Tracer};
use opentelemetry::{global, KeyValue};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TRACER_NAME: &str = "pdf-service";

/// Conversions slower than this are logged as warnings.
const SLOW_CONVERSION_MS: i64 = 5000;

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` (default: info); output is plain text
/// unless the configuration asks for JSON lines.
pub fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Records telemetry for a finished conversion.
///
/// Emits a `pdf_conversion_job` span and a structured log line carrying the
/// job id, status, input/output sizes, duration and error text.
pub fn record_job_telemetry(job: &ConversionJob) {
    let tracer = global::tracer(TRACER_NAME);
    let mut span = tracer.start("pdf_conversion_job");

    span.set_attribute(KeyValue::new("job_id", job.job_id.clone()));
    span.set_attribute(KeyValue::new("status", job.status.to_string()));
    span.set_attribute(KeyValue::new("html_bytes", job.html_bytes as i64));
    span.set_attribute(KeyValue::new("has_title", job.title.is_some()));
    if let Some(pdf_bytes) = job.pdf_bytes {
        span.set_attribute(KeyValue::new("pdf_bytes", pdf_bytes as i64));
    }

    if let Some(duration_ms) = job.processing_duration_ms() {
        span.set_attribute(KeyValue::new("duration_ms", duration_ms));

        info!(
            job_id = %job.job_id,
            duration_ms = duration_ms,
            status = %job.status,
            html_bytes = job.html_bytes,
            "PDF conversion finished"
        );

        if duration_ms > SLOW_CONVERSION_MS {
            warn!(
                job_id = %job.job_id,
                duration_ms = duration_ms,
                "PDF conversion exceeded performance threshold (5000ms)"
            );
        }
    }

    if job.status == JobStatus::Failed {
        if let Some(ref error) = job.error {
            span.set_attribute(KeyValue::new("error", error.clone()));
            warn!(job_id = %job.job_id, error = %error, "PDF conversion failed");
        }
    }

    span.end();
}

/// Records a request turned away because every render slot stayed busy.
pub fn record_saturation(waited: Duration) {
    let tracer = global::tracer(TRACER_NAME);
    let mut span = tracer.start("render_slots_saturated");
    span.set_attribute(KeyValue::new("waited_ms", waited.as_millis() as i64));
    span.end();

    warn!(
        waited_ms = waited.as_millis() as u64,
        "No render slot available, rejecting conversion"
    );
}

/// Initializes OpenTelemetry with an OTLP exporter.
///
/// Does nothing when no collector endpoint is configured. Must run inside
/// the tokio runtime because spans are exported by a batch task.
pub fn init_telemetry(config: &ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::Config;

    let Some(endpoint) = config.otlp_endpoint.as_deref() else {
        info!("Telemetry export disabled: OTEL_EXPORTER_OTLP_ENDPOINT not set");
        return Ok(());
    };

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(Config::default().with_resource(
            opentelemetry_sdk::Resource::new(vec![
                KeyValue::new("service.name", config.service_name.clone()),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            ]),
        ))
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    if let Some(provider) = tracer.provider() {
        global::set_tracer_provider(provider);
    }

    info!("Telemetry initialized: endpoint={}", endpoint);
    Ok(())
}

/// Flushes pending spans; call once before exit.
pub fn shutdown_telemetry() {
    global::shutdown_tracer_provider();
}
