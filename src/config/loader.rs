//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{CheckerConfig, NotifierConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `probe.auth_token`.
pub const AUTH_TOKEN_ENV: &str = "SRE_CHECKER_AUTH_TOKEN";

/// SMTP settings taken from the environment when the email notifier is active.
pub const SMTP_HOST_ENV: &str = "SRE_CHECKER_SMTP_HOST";
pub const SMTP_USER_ENV: &str = "SRE_CHECKER_SMTP_USER";
pub const SMTP_PASSWORD_ENV: &str = "SRE_CHECKER_SMTP_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text. Missing fields take their defaults.
pub fn parse_config(content: &str) -> Result<CheckerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Read and parse a TOML file, without environment overrides.
pub fn read_config(path: &Path) -> Result<CheckerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Read a TOML file and apply environment overrides. Not yet validated.
pub fn load_config(path: &Path) -> Result<CheckerConfig, ConfigError> {
    let mut config = read_config(path)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Apply secrets and SMTP settings from the process environment.
pub fn apply_env_overrides(config: &mut CheckerConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from `lookup`. Only secrets and SMTP settings are read here.
pub fn apply_overrides(config: &mut CheckerConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(AUTH_TOKEN_ENV) {
        config.probe.auth_token = token;
    }

    if let NotifierConfig::Email(email) = &mut config.notifier {
        if let Some(host) = lookup(SMTP_HOST_ENV) {
            email.smtp_host = host;
        }
        if let Some(user) = lookup(SMTP_USER_ENV) {
            email.smtp_user = user;
        }
        if let Some(password) = lookup(SMTP_PASSWORD_ENV) {
            email.smtp_password = password;
        }
    }
}

/// Run semantic validation, turning the error list into a [`ConfigError`].
pub fn finalize(config: CheckerConfig) -> Result<CheckerConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    if config.monitor.timeout_ms >= config.monitor.check_interval_ms {
        tracing::warn!(
            timeout_ms = config.monitor.timeout_ms,
            check_interval_ms = config.monitor.check_interval_ms,
            "Probe timeout is not below the check interval"
        );
    }
    Ok(config)
}
