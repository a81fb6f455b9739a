//! Structured logging setup.

use std::env;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Failure to install the logging subscriber.
#[derive(Debug)]
pub enum LoggingError {
    /// The level string is not a valid `EnvFilter` directive.
    InvalidFilter(String),
    /// `MPL_LOG_FORMAT` is neither `pretty` nor `json`.
    InvalidFormat(String),
    /// `MPL_LOG_FILE` could not be opened for appending.
    LogFile { path: String, source: io::Error },
    /// The subscriber could not be installed.
    Init(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::InvalidFilter(err) => write!(f, "Invalid log filter: {err}"),
            LoggingError::InvalidFormat(format) => write!(
                f,
                "Invalid MPL_LOG_FORMAT '{format}' (expected 'json' or 'pretty')"
            ),
            LoggingError::LogFile { path, source } => {
                write!(f, "Failed to open log file {path}: {source}")
            }
            LoggingError::Init(err) => write!(f, "Failed to initialize logging: {err}"),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn open_log_file(path: &str) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::LogFile {
            path: path.to_string(),
            source,
        })
}

fn map_init_err<E: fmt::Display>(err: E) -> LoggingError {
    LoggingError::Init(err.to_string())
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if level.eq_ignore_ascii_case("off") {
        Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
    } else {
        EnvFilter::try_new(level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
    }
}

fn use_json(format: &str) -> Result<bool, LoggingError> {
    if format.eq_ignore_ascii_case("json") {
        Ok(true)
    } else if format.eq_ignore_ascii_case("pretty") {
        Ok(false)
    } else {
        Err(LoggingError::InvalidFormat(format.to_string()))
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn output_layer<W>(writer: W, json: bool, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);
    if json {
        layer.json().boxed()
    } else {
        layer.pretty().boxed()
    }
}

/// Enable structured logging to stderr.
///
/// When `level` is `None`, this reads `MPL_TRACE` if set; otherwise the
/// level is `off`. `MPL_LOG_FORMAT` selects `pretty` (default) or `json`, and
/// `MPL_LOG_FILE` adds an append-mode file sink in the same format. Returns
/// `Ok(true)` when logging was initialized and `Ok(false)` if a subscriber is
/// already set.
pub fn init_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let level = level
        .map(str::to_string)
        .or_else(|| env::var("MPL_TRACE").ok())
        .unwrap_or_else(|| "off".to_string());
    let filter = build_filter(&level)?;
    let json = match env::var("MPL_LOG_FORMAT") {
        Ok(format) => use_json(&format)?,
        Err(_) => false,
    };

    let mut layers = vec![output_layer(io::stderr, json, true)];
    if let Ok(path) = env::var("MPL_LOG_FILE") {
        let file = open_log_file(&path)?;
        layers.push(output_layer(Mutex::new(file), json, false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(map_init_err)?;
    Ok(true)
}
