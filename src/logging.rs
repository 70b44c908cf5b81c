/// Structured logging for the compliance engine
///
/// Provides context-rich logging tagged with the engine area and, where one
/// applies, the monitoring site. Messages are emitted through `tracing`;
/// `init_logger` installs a console subscriber and an optional append-mode
/// log file for hosts that have not set up their own.

use crate::model::EngineError;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt as tracing_fmt};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine Areas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineArea {
    Exceedance,
    Completeness,
    Statistics,
    Limits,
    Config,
    Report,
}

impl fmt::Display for EngineArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineArea::Exceedance => write!(f, "EXCEED"),
            EngineArea::Completeness => write!(f, "COMPLETE"),
            EngineArea::Statistics => write!(f, "STATS"),
            EngineArea::Limits => write!(f, "LIMITS"),
            EngineArea::Config => write!(f, "CONFIG"),
            EngineArea::Report => write!(f, "REPORT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Setup
// ---------------------------------------------------------------------------

/// Installs the global `tracing` subscriber.
///
/// Console output goes to stderr. When `log_file` is given, every event is
/// also appended to that file without ANSI colour codes. Fails if the file
/// cannot be opened or a global subscriber is already installed.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&Path>,
    console_timestamps: bool,
) -> Result<(), EngineError> {
    let console = if console_timestamps {
        tracing_fmt::layer().with_writer(std::io::stderr).boxed()
    } else {
        tracing_fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .boxed()
    };

    let file = match log_file {
        Some(path) => {
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| EngineError::ConfigRead {
                    path: path.display().to_string(),
                    source,
                })?;
            Some(
                tracing_fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(handle))
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(LevelFilter::from(min_level))
        .try_init()
        .map_err(|e| EngineError::Logging(e.to_string()))
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(area: EngineArea, site: Option<&str>, message: &str) {
    tracing::info!(area = %area, site = site.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(area: EngineArea, site: Option<&str>, message: &str) {
    tracing::warn!(area = %area, site = site.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(area: EngineArea, site: Option<&str>, message: &str) {
    tracing::error!(area = %area, site = site.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(area: EngineArea, site: Option<&str>, message: &str) {
    tracing::debug!(area = %area, site = site.unwrap_or("-"), "{}", message);
}

/// Log a failed operation with its error chain
pub fn log_failure(area: EngineArea, operation: &str, err: &dyn std::error::Error) {
    let mut message = format!("{} failed: {}", operation, err);
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    error(area, None, &message);
}
