//! Log File Selection and Subscriber Setup

use relay_config::LogLevel;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::FmtSubscriber;

/// Preferred log file
pub const DEFAULT_LOG_PATH: &str = "/var/log/jec/send2jsm.log";

/// Log file used when the preferred one is not writable
pub const FALLBACK_LOG_PATH: &str = "/tmp/send2jsm.log";

/// Logger handle built once per invocation
pub struct LogHandle {
    /// Dispatcher to install
    pub dispatch: Dispatch,
    /// File being written, `None` when logging is disabled
    pub path: Option<PathBuf>,
}

/// Map the configured level to a tracing level
pub fn level_for(level: LogLevel) -> Level {
    match level {
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Choose the log file
///
/// Returns `desired` when `usable` accepts it, else `fallback` when usable,
/// else `None`.
pub fn resolve_log_path<F>(desired: &Path, fallback: &Path, usable: F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    [desired, fallback]
        .into_iter()
        .find(|path| usable(*path))
        .map(Path::to_path_buf)
}

/// Create the parent directory if missing and check the file opens for append
pub fn log_file_usable(path: &Path) -> bool {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if std::fs::create_dir_all(dir).is_err() {
            return false;
        }
    }
    open_log_file(path).is_ok()
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Build a plain-text subscriber writing to `writer`
pub fn build_dispatch<W>(level: LogLevel, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_for(level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .finish();
    Dispatch::new(subscriber)
}

/// Stderr subscriber used until the configuration names a level and file
pub fn bootstrap_dispatch() -> Dispatch {
    build_dispatch(LogLevel::Warning, std::io::stderr)
}

/// Set up file logging, falling back to the temporary location
pub fn init_logging(level: LogLevel, desired: &Path) -> LogHandle {
    let fallback = Path::new(FALLBACK_LOG_PATH);
    let disabled = || LogHandle {
        dispatch: Dispatch::none(),
        path: None,
    };

    let Some(path) = resolve_log_path(desired, fallback, log_file_usable) else {
        eprintln!(
            "Logging disabled. Reason: neither '{}' nor '{}' is writable",
            desired.display(),
            fallback.display()
        );
        return disabled();
    };
    if path.as_path() != desired {
        eprintln!(
            "Could not create log file '{}', will log to '{}'",
            desired.display(),
            path.display()
        );
    }

    match open_log_file(&path) {
        Ok(file) => LogHandle {
            dispatch: build_dispatch(level, Mutex::new(file)),
            path: Some(path),
        },
        Err(e) => {
            eprintln!("Logging disabled. Reason: {}: {}", path.display(), e);
            disabled()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_prefers_desired_path() {
        let chosen = resolve_log_path(Path::new("/a/app.log"), Path::new("/tmp/app.log"), |_| true);
        assert_eq!(chosen, Some(PathBuf::from("/a/app.log")));
    }

    #[test]
    fn test_falls_back_when_desired_unusable() {
        let chosen = resolve_log_path(Path::new("/a/app.log"), Path::new("/tmp/app.log"), |p| {
            p.starts_with("/tmp")
        });
        assert_eq!(chosen, Some(PathBuf::from("/tmp/app.log")));
    }

    #[test]
    fn test_disabled_when_nothing_usable() {
        let chosen = resolve_log_path(Path::new("/a/app.log"), Path::new("/b/app.log"), |_| false);
        assert_eq!(chosen, None);
    }

    #[test]
    fn test_log_file_usable_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/jec/send2jsm.log");
        assert!(log_file_usable(&path));
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_file_logging_respects_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("send2jsm.log");
        let handle = init_logging(LogLevel::Info, &path);
        assert_eq!(handle.path.as_deref(), Some(path.as_path()));

        tracing::dispatcher::with_default(&handle.dispatch, || {
            tracing::debug!("hidden detail");
            tracing::info!("visible message");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("visible message"));
        assert!(contents.contains("INFO"));
        assert!(!contents.contains("hidden detail"));
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_for(LogLevel::Warning), Level::WARN);
        assert_eq!(level_for(LogLevel::Debug), Level::DEBUG);
    }
}
