//! Bridge from `warden_config::Config` to session and logging types.

use warden_config::Config;
use warden_sftp::SessionOptions;
use warden_telemetry::{LogConfig, LogFormat, LogTarget};

/// Convert config to [`LogConfig`].
///
/// Logs always go to stderr: stdout carries replies under `warden serve`.
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Compact);

    let mut log_config = LogConfig::new(&cfg.logging.level)
        .with_format(format)
        .with_target(LogTarget::Stderr);

    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }

    log_config
}

/// Convert config to [`SessionOptions`].
#[must_use]
pub fn to_session_options(cfg: &Config) -> SessionOptions {
    SessionOptions {
        max_open_handles: cfg.session.max_open_handles,
        max_read_len: cfg.session.max_read_len,
    }
}
