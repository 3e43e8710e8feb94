//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or running a runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The builder was not given a required component.
    #[error("Missing runtime component: {0}")]
    MissingComponent(&'static str),

    /// Installing the shutdown signal handler failed.
    #[error("Failed to listen for shutdown signals: {0}")]
    Signal(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
