//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds >= 1, durations > 0)
//! - Check that every channel target parses for its probe kind
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CheckerConfig → Result<(), Vec<ValidationError>>
//! - Runs before any polling loop starts

use std::collections::HashSet;
use std::net::SocketAddr;

use lettre::message::Mailbox;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ChannelConfig, CheckerConfig, EmailConfig, NotifierConfig, ProbeKind};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be at least 1")]
    ZeroThreshold { field: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: String },

    #[error("at least one channel must be configured")]
    NoChannels,

    #[error("channel name must not be empty")]
    EmptyChannelName,

    #[error("duplicate channel name '{0}'")]
    DuplicateChannel(String),

    #[error("channel '{channel}': invalid TCP target '{target}' (expected host:port)")]
    InvalidTcpTarget { channel: String, target: String },

    #[error("channel '{channel}': invalid HTTP target '{target}': {reason}")]
    InvalidHttpTarget {
        channel: String,
        target: String,
        reason: String,
    },

    #[error("invalid webhook url '{url}': {reason}")]
    InvalidWebhook { url: String, reason: String },

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: String, value: String },

    #[error("invalid {field} mailbox '{value}'")]
    InvalidMailbox { field: String, value: String },

    #[error("notifier.smtp_host must be set for email notifications")]
    MissingSmtpHost,
}

/// Validate a fully layered configuration.
pub fn validate_config(config: &CheckerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let monitor = &config.monitor;
    check_threshold(&mut errors, "monitor.healthy_threshold", monitor.healthy_threshold);
    check_threshold(&mut errors, "monitor.unhealthy_threshold", monitor.unhealthy_threshold);
    check_duration(&mut errors, "monitor.check_interval_ms", monitor.check_interval_ms);
    check_duration(&mut errors, "monitor.timeout_ms", monitor.timeout_ms);

    if config.channels.is_empty() {
        errors.push(ValidationError::NoChannels);
    }

    let mut seen = HashSet::new();
    for channel in &config.channels {
        if channel.name.trim().is_empty() {
            errors.push(ValidationError::EmptyChannelName);
        } else if !seen.insert(channel.name.as_str()) {
            errors.push(ValidationError::DuplicateChannel(channel.name.clone()));
        }
        validate_channel(&mut errors, channel);
    }

    if let NotifierConfig::Webhook { url, timeout_ms, .. } = &config.notifier {
        if let Err(reason) = parse_http_url(url) {
            errors.push(ValidationError::InvalidWebhook {
                url: url.clone(),
                reason,
            });
        }
        check_duration(&mut errors, "notifier.timeout_ms", *timeout_ms);
    }
    if let NotifierConfig::Email(email) = &config.notifier {
        validate_email(&mut errors, email);
    }

    if config.feed.enabled {
        check_socket_addr(&mut errors, "feed.bind_address", &config.feed.bind_address);
    }
    if config.observability.metrics_enabled {
        check_socket_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_channel(errors: &mut Vec<ValidationError>, channel: &ChannelConfig) {
    if let Some(value) = channel.healthy_threshold {
        check_threshold(errors, &format!("channels.{}.healthy_threshold", channel.name), value);
    }
    if let Some(value) = channel.unhealthy_threshold {
        check_threshold(errors, &format!("channels.{}.unhealthy_threshold", channel.name), value);
    }

    match channel.kind {
        ProbeKind::Tcp => {
            if !is_host_port(&channel.target) {
                errors.push(ValidationError::InvalidTcpTarget {
                    channel: channel.name.clone(),
                    target: channel.target.clone(),
                });
            }
        }
        ProbeKind::Http => {
            if let Err(reason) = parse_http_url(&channel.target) {
                errors.push(ValidationError::InvalidHttpTarget {
                    channel: channel.name.clone(),
                    target: channel.target.clone(),
                    reason,
                });
            }
        }
    }
}

fn validate_email(errors: &mut Vec<ValidationError>, email: &EmailConfig) {
    for (field, value) in [("notifier.to", &email.to), ("notifier.from", &email.from)] {
        if value.parse::<Mailbox>().is_err() {
            errors.push(ValidationError::InvalidMailbox {
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }
    if email.smtp_host.trim().is_empty() {
        errors.push(ValidationError::MissingSmtpHost);
    }
    check_duration(errors, "notifier.timeout_ms", email.timeout_ms);
}

fn check_threshold(errors: &mut Vec<ValidationError>, field: &str, value: u32) {
    if value == 0 {
        errors.push(ValidationError::ZeroThreshold {
            field: field.to_string(),
        });
    }
}

fn check_duration(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: field.to_string(),
        });
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

/// `host:port` with a non-empty host and a numeric port.
pub fn is_host_port(target: &str) -> bool {
    match target.rsplit_once(':') {
        Some((host, port)) => {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            !host.is_empty() && !host.contains('/') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

/// Parse an absolute http/https URL with a host.
pub fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}
