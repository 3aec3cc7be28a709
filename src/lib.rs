//! HTML to PDF conversion service
//!
//! This library provides the core functionality of the PDF service: an HTTP
//! front that accepts HTML documents and returns PDFs rendered by a headless
//! Chromium process.
//!
//! ## Module Overview
//!
//! - `config`: Environment-driven service configuration
//! - `converter`: Conversion orchestration with bounded render slots
//! - `error`: Conversion and HTTP error types
//! - `http`: axum routes (`/health`, `/convert`)
//! - `job`: Per-request job record
//! - `renderer`: Headless Chromium invocation
//! - `staging`: Staging directory and per-request temporary files
//! - `telemetry`: Logging setup and OpenTelemetry spans
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pdf_service::{config::ServiceConfig, converter::Converter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServiceConfig::from_env();
//!     let converter = Converter::from_config(&config);
//!
//!     let pdf = converter
//!         .convert("<html><body>Hello</body></html>", None)
//!         .await
//!         .expect("conversion failed");
//!     assert!(pdf.starts_with(b"%PDF"));
//! }
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod http;
pub mod job;
pub mod renderer;
pub mod staging;
pub mod telemetry;
