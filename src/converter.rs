//! Conversion orchestration: render slots, staging, renderer invocation.

use crate::config::ServiceConfig;
use crate::error::ConversionError;
use crate::job::ConversionJob;
use crate::renderer::{ChromiumRenderer, PdfRenderer};
use crate::staging::StagingArea;
use crate::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{error, info};

/// HTML to PDF converter.
///
/// Each call stages its own uniquely named artifact pair, so concurrent
/// conversions never touch each other's files. The number of renderer
/// processes running at once is bounded by a semaphore; callers wait up to
/// `queue_timeout` for a slot before being turned away.
pub struct Converter {
    renderer: Arc<dyn PdfRenderer>,
    staging: StagingArea,
    slots: Semaphore,
    queue_timeout: Duration,
}

impl Converter {
    pub fn new(
        renderer: Arc<dyn PdfRenderer>,
        staging: StagingArea,
        max_concurrent: usize,
        queue_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            staging,
            slots: Semaphore::new(max_concurrent.max(1)),
            queue_timeout,
        }
    }

    /// Builds a converter backed by headless Chromium.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            Arc::new(ChromiumRenderer::from_config(config)),
            StagingArea::new(&config.staging_dir),
            config.max_concurrent_renders,
            config.queue_timeout,
        )
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Converts `html` to PDF bytes.
    ///
    /// # Errors
    ///
    /// - `Busy` if no render slot frees up within the queue timeout
    /// - I/O errors staging the input or reading the output
    /// - Renderer launch failure, non-zero exit or timeout
    pub async fn convert(
        &self,
        html: &str,
        title: Option<&str>,
    ) -> Result<Vec<u8>, ConversionError> {
        let _permit = self.acquire_slot().await?;

        let mut job = ConversionJob::new(title.map(str::to_owned), html.len());
        job.start_processing();
        info!(
            "Processing conversion: job_id={}, html_bytes={}, title={:?}",
            job.job_id, job.html_bytes, job.title
        );

        let result = self.run(&job, html).await;

        match &result {
            Ok(pdf) => {
                job.mark_complete(pdf.len());
                info!(
                    "Conversion completed: job_id={}, pdf_bytes={}, duration_ms={:?}",
                    job.job_id,
                    pdf.len(),
                    job.processing_duration_ms()
                );
            }
            Err(e) => {
                let error_msg = e.to_string();
                error!("Conversion failed: job_id={}, error={}", job.job_id, error_msg);
                job.mark_failed(error_msg);
            }
        }

        telemetry::record_job_telemetry(&job);
        result
    }

    async fn run(&self, job: &ConversionJob, html: &str) -> Result<Vec<u8>, ConversionError> {
        let dir = self.staging.prepare().await?;
        // Both files are removed when `artifacts` goes out of scope
        let artifacts = self.staging.allocate(&dir, &job.job_id);
        artifacts.write_input(html).await?;
        self.renderer
            .render(job, &artifacts)
            .await
            .map_err(ConversionError::render)
    }

    async fn acquire_slot(&self) -> Result<SemaphorePermit<'_>, ConversionError> {
        match tokio::time::timeout(self.queue_timeout, self.slots.acquire()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) | Err(_) => {
                telemetry::record_saturation(self.queue_timeout);
                Err(ConversionError::Busy(self.queue_timeout))
            }
        }
    }
}
