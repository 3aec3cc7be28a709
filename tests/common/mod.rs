//! Shared fixtures: stand-in browser scripts and router construction.

#![allow(dead_code)]

use axum::Router;
use pdf_service::config::ServiceConfig;
use pdf_service::converter::Converter;
use pdf_service::http::{self, AppState};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

/// Writes `%PDF-1.4` followed by the staged HTML to the `--print-to-pdf` path.
const RENDERING_SCRIPT: &str = r#"#!/bin/sh
out=""
input=""
for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*) out="${arg#--print-to-pdf=}" ;;
    file://*) input="${arg#file://}" ;;
  esac
done
{ printf '%%PDF-1.4\n'; cat "$input"; } > "$out"
"#;

const FAILING_SCRIPT: &str = r#"#!/bin/sh
echo "loading page"
echo "renderer exploded: no display" >&2
exit 3
"#;

const HANGING_SCRIPT: &str = "#!/bin/sh\nexec sleep 30\n";

const SILENT_SCRIPT: &str = "#!/bin/sh\nexit 0\n";

pub struct Browsers {
    _dir: TempDir,
    pub rendering: PathBuf,
    pub failing: PathBuf,
    pub hanging: PathBuf,
    pub silent: PathBuf,
}

/// Stand-in browser binaries, written once per test binary.
///
/// All scripts are written and closed before any test spawns one, which
/// avoids `ETXTBSY` from descriptors inherited across concurrent forks.
pub fn browsers() -> &'static Browsers {
    static BROWSERS: OnceLock<Browsers> = OnceLock::new();
    BROWSERS.get_or_init(|| {
        let dir = tempfile::tempdir().expect("create script dir");
        let write = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, body).expect("write script");
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .expect("chmod script");
            path
        };
        Browsers {
            rendering: write("render.sh", RENDERING_SCRIPT),
            failing: write("fail.sh", FAILING_SCRIPT),
            hanging: write("hang.sh", HANGING_SCRIPT),
            silent: write("silent.sh", SILENT_SCRIPT),
            _dir: dir,
        }
    })
}

pub fn config(browser: &Path, staging: &Path) -> ServiceConfig {
    ServiceConfig {
        staging_dir: staging.to_path_buf(),
        chromium_bin: browser.to_string_lossy().into_owned(),
        render_timeout: Duration::from_secs(10),
        queue_timeout: Duration::from_secs(10),
        ..ServiceConfig::default()
    }
}

pub fn app(config: &ServiceConfig) -> Router {
    http::router(AppState::new(Converter::from_config(config)), config)
}

pub fn staged_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
