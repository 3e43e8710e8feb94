//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    /// Turn processing settings.
    pub runtime: RuntimeSettings,

    /// Logging settings.
    pub logging: LoggingConfig,
}

// =============================================================================
// Runtime
// =============================================================================

/// Turn processing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Upper bound on turns processed at the same time.
    pub max_concurrent_turns: usize,

    /// Capacity of the inbound activity channel.
    pub inbound_buffer: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            max_concurrent_turns: 64,
            inbound_buffer: 256,
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Newline-delimited JSON. Needs the `json-log` feature, falls back to
    /// `full` without it.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    #[default]
    Never,
}

impl LogRotation {
    pub(crate) fn to_appender_rotation(self) -> tracing_appender::rolling::Rotation {
        use tracing_appender::rolling::Rotation;

        match self {
            Self::Minutely => Rotation::MINUTELY,
            Self::Hourly => Rotation::HOURLY,
            Self::Daily => Rotation::DAILY,
            Self::Never => Rotation::NEVER,
        }
    }
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level, overridden by `RUST_LOG` when set.
    pub level: LogLevel,

    pub format: LogFormat,

    pub output: LogOutput,

    pub span_events: SpanEventConfig,

    /// Include thread ids in every line.
    pub thread_ids: bool,

    /// Include source file and line in every line.
    pub file_location: bool,

    /// Log file path, required when `output = "file"`.
    pub file_path: Option<PathBuf>,

    pub rotation: LogRotation,

    /// Rotated files to keep; `0` keeps all of them.
    pub max_files: usize,

    /// Per-target levels, e.g. `parley_core = "trace"`.
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::Never,
            max_files: 5,
            filters: BTreeMap::new(),
        }
    }
}
