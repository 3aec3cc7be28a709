//! Service configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_STAGING_DIR: &str = "/tmp/pdf-conversion";
pub const DEFAULT_CHROMIUM_BIN: &str = "chromium-browser";
pub const DEFAULT_VIRTUAL_TIME_BUDGET_MS: u64 = 5000;
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_WORKER_CONCURRENCY: usize = 4;
pub const DEFAULT_QUEUE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_SERVICE_NAME: &str = "pdf-service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Runtime settings for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub staging_dir: PathBuf,
    pub chromium_bin: String,
    pub virtual_time_budget_ms: u64,
    pub render_timeout: Duration,
    pub max_concurrent_renders: usize,
    pub queue_timeout: Duration,
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            chromium_bin: DEFAULT_CHROMIUM_BIN.to_string(),
            virtual_time_budget_ms: DEFAULT_VIRTUAL_TIME_BUDGET_MS,
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            max_concurrent_renders: DEFAULT_WORKER_CONCURRENCY,
            queue_timeout: Duration::from_secs(DEFAULT_QUEUE_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_format: LogFormat::Text,
            otlp_endpoint: None,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Loads the configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `LISTEN_ADDR`: bind address (default: 0.0.0.0:8081)
    /// - `STAGING_DIR`: scratch directory for per-request files (default: /tmp/pdf-conversion)
    /// - `CHROMIUM_BIN`: headless browser executable (default: chromium-browser)
    /// - `VIRTUAL_TIME_BUDGET_MS`: browser virtual time budget (default: 5000)
    /// - `RENDER_TIMEOUT_SECS`: deadline for one browser process (default: 60)
    /// - `WORKER_CONCURRENCY`: concurrent browser processes (default: 4)
    /// - `QUEUE_TIMEOUT_SECS`: max wait for a free render slot (default: 30)
    /// - `MAX_BODY_BYTES`: request body limit (default: 10 MiB)
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`: enables OTLP export when set
    /// - `OTEL_SERVICE_NAME`: telemetry service name (default: pdf-service)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Unparsable values fall back to their default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = parse_or(&lookup, "LISTEN_ADDR", defaults.listen_addr);
        let staging_dir = lookup("STAGING_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.staging_dir);
        let chromium_bin = lookup("CHROMIUM_BIN")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.chromium_bin);
        let virtual_time_budget_ms =
            parse_or(&lookup, "VIRTUAL_TIME_BUDGET_MS", defaults.virtual_time_budget_ms);
        let render_timeout = Duration::from_secs(parse_or(
            &lookup,
            "RENDER_TIMEOUT_SECS",
            DEFAULT_RENDER_TIMEOUT_SECS,
        ));
        let max_concurrent_renders =
            parse_or(&lookup, "WORKER_CONCURRENCY", defaults.max_concurrent_renders).max(1);
        let queue_timeout = Duration::from_secs(parse_or(
            &lookup,
            "QUEUE_TIMEOUT_SECS",
            DEFAULT_QUEUE_TIMEOUT_SECS,
        ));
        let max_body_bytes = parse_or(&lookup, "MAX_BODY_BYTES", defaults.max_body_bytes);
        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty());
        let service_name = lookup("OTEL_SERVICE_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.service_name);

        Self {
            listen_addr,
            staging_dir,
            chromium_bin,
            virtual_time_budget_ms,
            render_timeout,
            max_concurrent_renders,
            queue_timeout,
            max_body_bytes,
            log_format,
            otlp_endpoint,
            service_name,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid {}={:?}, using default", key, raw);
                default
            }
        },
        None => default,
    }
}
