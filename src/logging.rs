use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. `debug` selects the `debug` level, which `RUST_LOG` may
/// then override; otherwise the level is forced to `info` so a stray
/// `RUST_LOG` in the user's environment cannot make the overlay chatty.
///
/// When `log_file` is set, output goes to that file instead of stderr. If the
/// file cannot be opened we fall back to stderr and say so.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let filter = level_filter(debug);

    let appender = log_file.as_deref().map(|path| (path, file_appender(path)));
    match appender {
        Some((_, Ok(appender))) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(appender)
                .try_init();
        }
        Some((path, Err(err))) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            tracing::warn!(path = %path.display(), %err, "log file unavailable; logging to stderr");
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

fn level_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(dir)
        .map_err(anyhow::Error::from)
}

#[cfg(test)]
mod tests {
    use super::file_appender;
    use std::path::Path;

    #[test]
    fn appender_requires_a_file_name() {
        assert!(file_appender(Path::new("/")).is_err());
    }

    #[test]
    fn appender_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("logs").join("overlay.log");
        assert!(file_appender(&path).is_ok());
        assert!(path.exists());
    }
}
