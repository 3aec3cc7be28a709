//! Per-request conversion job record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// One HTML to PDF conversion, from slot acquisition to response.
///
/// The job id doubles as the unique suffix of the staged artifact names, so
/// a job and its files can be correlated in logs.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionJob {
    pub job_id: String,
    /// Accepted from the request and carried for logs; not injected into the document.
    pub title: Option<String>,
    pub html_bytes: usize,
    pub pdf_bytes: Option<usize>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Complete,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Complete => write!(f, "complete"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl ConversionJob {
    pub fn new(title: Option<String>, html_bytes: usize) -> Self {
        let now = Utc::now();
        Self {
            job_id: Uuid::new_v4().simple().to_string(),
            title,
            html_bytes,
            pdf_bytes: None,
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
            error: None,
        }
    }

    pub fn start_processing(&mut self) {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
    }

    pub fn mark_complete(&mut self, pdf_bytes: usize) {
        self.status = JobStatus::Complete;
        self.updated_at = Utc::now();
        self.pdf_bytes = Some(pdf_bytes);
        self.error = None;
    }

    pub fn mark_failed(&mut self, error: String) {
        self.status = JobStatus::Failed;
        self.updated_at = Utc::now();
        self.error = Some(error);
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Complete | JobStatus::Failed)
    }

    pub fn processing_duration_ms(&self) -> Option<i64> {
        if self.is_terminal() {
            Some(self.updated_at.signed_duration_since(self.created_at).num_milliseconds())
        } else {
            None
        }
    }
}
