//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Largest accepted `session.max_read_len` (16 MiB).
const MAX_READ_LEN_UPPER_BOUND: u32 = 16_777_216;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_session(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_session(config: &Config) -> ConfigResult<()> {
    let s = &config.session;

    if !s.root.is_absolute() {
        return Err(ConfigError::ValidationError {
            field: "session.root".to_owned(),
            message: format!("'{}' is not an absolute path", s.root.display()),
        });
    }

    if s.max_open_handles == 0 {
        return Err(ConfigError::ValidationError {
            field: "session.max_open_handles".to_owned(),
            message: "max_open_handles must be at least 1".to_owned(),
        });
    }

    if s.max_read_len == 0 || s.max_read_len > MAX_READ_LEN_UPPER_BOUND {
        return Err(ConfigError::ValidationError {
            field: "session.max_read_len".to_owned(),
            message: format!("max_read_len must be between 1 and {MAX_READ_LEN_UPPER_BOUND}"),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    Ok(())
}
