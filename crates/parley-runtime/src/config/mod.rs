//! Configuration for the Parley runtime.
//!
//! Settings are layered with figment: built-in defaults, then `parley.toml`
//! (or YAML) files, then `PARLEY_*` environment variables.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, ParleyConfig, RuntimeSettings,
    SpanEventConfig,
};
pub use validation::validate_config;
