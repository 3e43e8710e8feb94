//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, ParleyConfig, RuntimeSettings};

/// Validates the entire configuration.
pub fn validate_config(config: &ParleyConfig) -> ConfigResult<()> {
    validate_runtime_settings(&config.runtime)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_runtime_settings(runtime: &RuntimeSettings) -> ConfigResult<()> {
    if runtime.max_concurrent_turns == 0 {
        return Err(ConfigError::validation(
            "runtime.max_concurrent_turns must be greater than 0",
        ));
    }

    if runtime.inbound_buffer == 0 {
        return Err(ConfigError::validation(
            "runtime.inbound_buffer must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|t| t.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid logging filter target: {target:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&ParleyConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = ParleyConfig::default();
        config.runtime.max_concurrent_turns = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_concurrent_turns"));
    }

    #[test]
    fn test_validate_zero_buffer() {
        let mut config = ParleyConfig::default();
        config.runtime.inbound_buffer = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = ParleyConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/parley.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_blank_filter_target() {
        let mut config = ParleyConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
