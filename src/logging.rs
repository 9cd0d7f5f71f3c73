//! Console and file logging
//!
//! Every record goes to stderr and is appended to a plain-text log file.
//! The default filter admits the library and both binaries at `info`
//! (`debug` when verbose); `RUST_LOG` overrides it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILE: &str = "logs/logs_dimensional_data_pipeline.txt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Log targets admitted by the default filter
const TARGETS: [&str; 3] = ["dimensional_pipeline", "dimensional_flow", "load_staging"];

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log file path: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Span fields are formatted once per field formatter type and cached on
/// the span. The file layer gets its own type so it never reuses the
/// console's coloured rendering.
#[derive(Debug, Default)]
struct PlainFields(DefaultFields);

impl<'writer> FormatFields<'writer> for PlainFields {
    fn format_fields<R: RecordFields>(&self, writer: Writer<'writer>, fields: R) -> std::fmt::Result {
        let mut writer = writer;
        self.0.format_fields(Writer::new(&mut writer), fields)
    }
}

fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Console-only logging for short-lived tools
pub fn init_console_logging(verbose: bool) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_target(false)
                .with_filter(env_filter(verbose)),
        )
        .try_init()?;
    Ok(())
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// or buffered file records are lost.
pub fn init_logging(log_file: &Path, verbose: bool) -> Result<WorkerGuard, LoggingError> {
    let file_name = log_file
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(log_file.to_path_buf()))?;
    let log_dir = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).map_err(|source| LoggingError::CreateDir {
            path: log_dir.clone(),
            source,
        })?;
    }

    let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_target(false)
                .with_filter(env_filter(verbose)),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .fmt_fields(PlainFields::default())
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_ansi(false)
                .with_filter(env_filter(verbose)),
        )
        .try_init()?;

    tracing::debug!(log_file = %log_file.display(), "Logging initialized");
    Ok(guard)
}
