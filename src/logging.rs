use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::env_bool;

const LOG_FILE_PREFIX: &str = "phonics.log";
const DEFAULT_LOG_DIR: &str = "./logs";

/// Keeps the background file writer alive; dropping it flushes the log.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Where, if anywhere, log lines are mirrored to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub file_dir: Option<PathBuf>,
}

impl LogSettings {
    /// `ENABLE_FILE_LOGS` turns on the daily rolling file under `LOG_DIR`.
    pub fn from_env(filter: &str) -> Self {
        let file_dir = env_bool("ENABLE_FILE_LOGS")
            .unwrap_or(false)
            .then(|| {
                std::env::var("LOG_DIR")
                    .ok()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())
            })
            .map(PathBuf::from);
        Self {
            filter: filter.to_string(),
            file_dir,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn open_file_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("failed to create log directory {}: {err}", dir.display());
        return None;
    }
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}

pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    init_with(&LogSettings::from_env(log_level))
}

pub fn init_with(settings: &LogSettings) -> Option<FileLogGuard> {
    let file = settings.file_dir.as_deref().and_then(open_file_writer);
    let (file_layer, guard) = match file {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)),
            Some(FileLogGuard { _guard: guard }),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(settings.env_filter())
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    guard
}
