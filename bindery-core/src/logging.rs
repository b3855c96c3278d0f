//! Logging setup for applications using the adapter.
//!
//! The adapter itself only emits `tracing` events (targets
//! `bindery::funnel`, `bindery::adapter`, `bindery::router` and
//! `bindery::envelope`). [`LogConfig`] installs a subscriber for them.
//! Defaults to JSON output to STDOUT at INFO level.
//!
//! ```no_run
//! use bindery_core::logging::*;
//!
//! # fn main() -> Result<(), bindery_core::Error> {
//! let _guard = LogConfig::from_env()?
//!     .format(LogFormat::Pretty)
//!     .init()?;
//!
//! info!("Application started");
//! # Ok(())
//! # }
//! ```

use crate::Error;
use std::env;
use std::io;
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use tracing::{debug, error, info, trace, warn};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(Error::Config(format!("unknown log level: {}", other))),
        }
    }
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured, machine-readable
    Json,
    Plain,
    /// Multi-line, for development
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "plain" | "text" => Ok(LogFormat::Plain),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(Error::Config(format!("unknown log format: {}", other))),
        }
    }
}

/// Output destination for logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Append to a single file
    File(String),
    RollingFile {
        directory: String,
        prefix: String,
        rotation: Rotation,
    },
}

/// File rotation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl Rotation {
    fn to_tracing_rotation(self) -> tracing_appender::rolling::Rotation {
        match self {
            Rotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
            Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
            Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
            Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
        }
    }
}

/// Logging configuration.
///
/// # Environment Variables
///
/// - `BINDERY_LOG_LEVEL`: `trace`, `debug`, `info`, `warn` or `error`
/// - `BINDERY_LOG_FORMAT`: `json`, `plain`, `pretty` or `compact`
/// - `RUST_LOG`: used as the filter when no explicit filter is set
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Include the event target (`bindery::funnel`, ...)
    pub targets: bool,
    pub colors: bool,
    /// Overrides `level` when set, e.g. `"bindery=debug,my_app=info"`
    pub env_filter: Option<String>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `BINDERY_LOG_LEVEL` and `BINDERY_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(level) = lookup("BINDERY_LOG_LEVEL") {
            config.level = level.parse()?;
        }
        if let Some(format) = lookup("BINDERY_LOG_FORMAT") {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    pub fn with_colors(mut self, enable: bool) -> Self {
        self.colors = enable;
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, Error> {
        match &self.env_filter {
            Some(filter) => EnvFilter::try_new(filter)
                .map_err(|e| Error::Config(format!("invalid log filter {:?}: {}", filter, e))),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))),
        }
    }

    fn writer(&self) -> Result<(NonBlocking, WorkerGuard), Error> {
        Ok(match &self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogOutput::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                tracing_appender::non_blocking(file)
            }
            LogOutput::RollingFile {
                directory,
                prefix,
                rotation,
            } => tracing_appender::non_blocking(tracing_appender::rolling::RollingFileAppender::new(
                rotation.to_tracing_rotation(),
                directory,
                prefix,
            )),
        })
    }

    /// Install the global subscriber.
    ///
    /// Keep the returned guard alive for the lifetime of the program; logs
    /// are flushed when it is dropped. Fails if the log file cannot be
    /// opened or a global subscriber is already installed.
    pub fn init(self) -> Result<WorkerGuard, Error> {
        let filter = self.filter()?;
        let (writer, guard) = self.writer()?;

        let layer = match self.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(self.targets)
                .boxed(),
            LogFormat::Plain => fmt::layer()
                .with_writer(writer)
                .with_target(self.targets)
                .with_ansi(self.colors)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_writer(writer)
                .with_target(self.targets)
                .with_ansi(self.colors)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_writer(writer)
                .with_target(self.targets)
                .with_ansi(self.colors)
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .map_err(|e| Error::Config(format!("failed to install subscriber: {}", e)))?;
        Ok(guard)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            targets: true,
            colors: false,
            env_filter: None,
        }
    }
}
