//! Error types for conversion and the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single HTML to PDF conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to prepare staging directory {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write HTML file: {0}")]
    WriteInput(#[source] io::Error),

    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("{binary} failed: {status}, output: {output}")]
    RendererExit {
        binary: String,
        status: ExitStatus,
        output: String,
    },

    #[error("{binary} did not finish within {timeout:?}")]
    Timeout { binary: String, timeout: Duration },

    #[error("failed to read PDF output: {0}")]
    ReadOutput(#[source] io::Error),

    #[error("no render slot became available within {0:?}")]
    Busy(Duration),

    #[error("failed to convert HTML to PDF: {0}")]
    Render(#[source] Box<ConversionError>),
}

/// Coarse classification of a [`ConversionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Renderer,
    Timeout,
    Busy,
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::Staging { .. }
            | ConversionError::WriteInput(_)
            | ConversionError::ReadOutput(_) => ErrorKind::Io,
            ConversionError::Launch { .. } | ConversionError::RendererExit { .. } => {
                ErrorKind::Renderer
            }
            ConversionError::Timeout { .. } => ErrorKind::Timeout,
            ConversionError::Busy(_) => ErrorKind::Busy,
            ConversionError::Render(inner) => inner.kind(),
        }
    }

    /// Wraps an error raised while the renderer was running.
    pub fn render(inner: ConversionError) -> Self {
        ConversionError::Render(Box::new(inner))
    }
}

/// Error returned by the HTTP handlers. The `Display` text is the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON")]
    InvalidJson,

    #[error("HTML content is required")]
    MissingHtml,

    #[error("PDF generation failed: {0}")]
    Conversion(#[from] ConversionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson | ApiError::MissingHtml => StatusCode::BAD_REQUEST,
            ApiError::Conversion(err) => match err.kind() {
                ErrorKind::Io | ErrorKind::Renderer => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::Busy => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validation_statuses() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingHtml.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingHtml.to_string(), "HTML content is required");
    }

    #[test]
    fn test_conversion_statuses_follow_kind() {
        let io = ApiError::from(ConversionError::ReadOutput(io::Error::from(
            io::ErrorKind::NotFound,
        )));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let timeout = ApiError::from(ConversionError::Timeout {
            binary: "chromium-browser".to_string(),
            timeout: Duration::from_secs(60),
        });
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);

        let busy = ApiError::from(ConversionError::Busy(Duration::from_secs(30)));
        assert_eq!(busy.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_render_wrapper_keeps_inner_kind() {
        let wrapped = ConversionError::render(ConversionError::Timeout {
            binary: "chromium-browser".to_string(),
            timeout: Duration::from_secs(60),
        });

        assert_eq!(wrapped.kind(), ErrorKind::Timeout);
        assert_eq!(ApiError::from(wrapped).status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_render_wrapper_message_includes_inner() {
        let wrapped = ConversionError::render(ConversionError::ReadOutput(io::Error::new(
            io::ErrorKind::NotFound,
            "no such file",
        )));

        assert_eq!(
            ApiError::from(wrapped).to_string(),
            "PDF generation failed: failed to convert HTML to PDF: \
             failed to read PDF output: no such file"
        );
    }

    #[test]
    fn test_launch_failure_is_renderer_kind() {
        let err = ConversionError::Launch {
            binary: "chromium-browser".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };

        assert_eq!(err.kind(), ErrorKind::Renderer);
        assert!(ApiError::from(err)
            .to_string()
            .starts_with("PDF generation failed: failed to launch chromium-browser"));
    }
}
