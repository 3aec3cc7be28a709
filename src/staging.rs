//! Staging directory and per-request temporary artifacts.

use crate::error::ConversionError;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory holding the transient input/output files of in-flight requests.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the staging directory if needed and returns its absolute path.
    ///
    /// Safe to call on every request; creation is idempotent.
    pub async fn prepare(&self) -> Result<PathBuf, ConversionError> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);

        builder.create(&self.root).await.map_err(|source| self.staging_error(source))?;
        tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|source| self.staging_error(source))
    }

    /// Allocates the input/output file pair for one job.
    ///
    /// Names combine a second-resolution timestamp with the job's UUID, so
    /// requests arriving in the same second never share a path.
    pub fn allocate(&self, dir: &Path, job_id: &str) -> ArtifactPair {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let id = format!("{}_{}", stamp, job_id);
        ArtifactPair {
            input: dir.join(format!("input_{}.html", id)),
            output: dir.join(format!("output_{}.pdf", id)),
        }
    }

    fn staging_error(&self, source: io::Error) -> ConversionError {
        ConversionError::Staging {
            path: self.root.clone(),
            source,
        }
    }
}

/// Input HTML and output PDF paths owned by one request.
///
/// Both files are removed when the pair is dropped, whichever way the
/// request ends.
#[derive(Debug)]
pub struct ArtifactPair {
    input: PathBuf,
    output: PathBuf,
}

impl ArtifactPair {
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub async fn write_input(&self, html: &str) -> Result<(), ConversionError> {
        tokio::fs::write(&self.input, html.as_bytes())
            .await
            .map_err(ConversionError::WriteInput)
    }
}

impl Drop for ArtifactPair {
    // Drop cannot await, so removal is synchronous: two unlinks on the worker thread.
    fn drop(&mut self) {
        for path in [&self.input, &self.output] {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed staged artifact: {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove staged artifact {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_prepare_creates_nested_directory() {
        let temp = tempdir().unwrap();
        let staging = StagingArea::new(temp.path().join("a/b/staging"));

        let dir = staging.prepare().await.unwrap();
        assert!(dir.is_dir());
        assert!(dir.is_absolute());

        // Second call is a no-op
        assert_eq!(staging.prepare().await.unwrap(), dir);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prepare_fails_when_path_is_a_file() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let staging = StagingArea::new(&blocker);
        let err = staging.prepare().await.unwrap_err();
        assert!(matches!(err, ConversionError::Staging { .. }));
    }

    #[tokio::test]
    async fn test_allocate_names_are_unique_within_a_second() {
        let temp = tempdir().unwrap();
        let staging = StagingArea::new(temp.path());
        let dir = staging.prepare().await.unwrap();

        let a = staging.allocate(&dir, "aaaa");
        let b = staging.allocate(&dir, "bbbb");

        assert_ne!(a.input_path(), b.input_path());
        assert_ne!(a.output_path(), b.output_path());

        let name = a.input_path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("input_"));
        assert!(name.ends_with("_aaaa.html"));
        assert!(a
            .output_path()
            .to_string_lossy()
            .ends_with("_aaaa.pdf"));
    }

    #[tokio::test]
    async fn test_drop_removes_both_files() {
        let temp = tempdir().unwrap();
        let staging = StagingArea::new(temp.path());
        let dir = staging.prepare().await.unwrap();

        let pair = staging.allocate(&dir, "job");
        pair.write_input("<html></html>").await.unwrap();
        std::fs::write(pair.output_path(), b"%PDF-1.4").unwrap();
        assert_eq!(entries(&dir), 2);

        drop(pair);
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_drop_tolerates_missing_output() {
        let temp = tempdir().unwrap();
        let staging = StagingArea::new(temp.path());
        let dir = staging.prepare().await.unwrap();

        let pair = staging.allocate(&dir, "job");
        pair.write_input("<p>only input</p>").await.unwrap();
        drop(pair);

        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_write_input_into_missing_directory_fails() {
        let temp = tempdir().unwrap();
        let staging = StagingArea::new(temp.path());
        let pair = staging.allocate(&temp.path().join("gone"), "job");

        let err = pair.write_input("<p>x</p>").await.unwrap_err();
        assert!(matches!(err, ConversionError::WriteInput(_)));
    }
}
