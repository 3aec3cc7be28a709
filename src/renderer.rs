//! Headless Chromium invocation.

use crate::config::ServiceConfig;
use crate::error::ConversionError;
use crate::job::ConversionJob;
use crate::staging::ArtifactPair;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Renders a staged HTML file into a PDF and returns the PDF bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(
        &self,
        job: &ConversionJob,
        artifacts: &ArtifactPair,
    ) -> Result<Vec<u8>, ConversionError>;
}

/// Runs the Chromium binary once per conversion with a fixed flag set.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    binary: String,
    virtual_time_budget_ms: u64,
    timeout: Duration,
}

impl ChromiumRenderer {
    pub fn new(binary: impl Into<String>, virtual_time_budget_ms: u64, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            virtual_time_budget_ms,
            timeout,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.chromium_bin.clone(),
            config.virtual_time_budget_ms,
            config.render_timeout,
        )
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Command-line arguments for rendering `input` into `output`.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            format!("--print-to-pdf={}", output.display()),
            "--print-to-pdf-no-header".to_string(),
            "--run-all-compositor-stages-before-draw".to_string(),
            format!("--virtual-time-budget={}", self.virtual_time_budget_ms),
            format!("file://{}", input.display()),
        ]
    }
}

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render(
        &self,
        job: &ConversionJob,
        artifacts: &ArtifactPair,
    ) -> Result<Vec<u8>, ConversionError> {
        let input = artifacts.input_path();
        let output = artifacts.output_path();
        info!(
            "Rendering HTML to PDF: job_id={}, input={}",
            job.job_id,
            input.display()
        );

        let child = Command::new(&self.binary)
            .args(self.args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConversionError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        // Dropping the child on timeout kills the process
        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                return Err(ConversionError::Timeout {
                    binary: self.binary.clone(),
                    timeout: self.timeout,
                })
            }
        };
        let result = result.map_err(|source| ConversionError::Launch {
            binary: self.binary.clone(),
            source,
        })?;

        if !result.status.success() {
            let mut combined = result.stdout;
            combined.extend_from_slice(&result.stderr);
            return Err(ConversionError::RendererExit {
                binary: self.binary.clone(),
                status: result.status,
                output: String::from_utf8_lossy(&combined).trim().to_string(),
            });
        }

        let pdf = tokio::fs::read(output)
            .await
            .map_err(ConversionError::ReadOutput)?;

        debug!("Renderer produced {} bytes: job_id={}", pdf.len(), job.job_id);
        Ok(pdf)
    }
}
