//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into probers, thresholds and a notifier
//! - Assemble the monitor that owns every channel loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, no loop starts on a bad config
//! - Per-channel threshold overrides fall back to the global values

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::validation::parse_http_url;
use crate::config::{ChannelConfig, CheckerConfig, NotifierConfig, ProbeKind};
use crate::health::{Channel, ChannelSpec, Monitor, MonitorSettings, ThresholdError, Thresholds};
use crate::notify::email::EmailError;
use crate::notify::{EmailNotifier, LogNotifier, Notifier, WebhookNotifier};
use crate::probe::{HttpProber, Prober, TcpProber};

/// Failure while assembling runtime components.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("channel '{channel}': {source}")]
    Threshold {
        channel: String,
        #[source]
        source: ThresholdError,
    },

    #[error("invalid url '{url}': {reason}")]
    Url { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("email notifier: {0}")]
    Email(#[from] EmailError),
}

pub fn monitor_settings(config: &CheckerConfig) -> MonitorSettings {
    MonitorSettings {
        check_interval: Duration::from_millis(config.monitor.check_interval_ms),
        timeout: Duration::from_millis(config.monitor.timeout_ms),
    }
}

pub fn channel_thresholds(config: &CheckerConfig, channel: &ChannelConfig) -> Result<Thresholds, StartupError> {
    Thresholds::new(
        channel.healthy_threshold.unwrap_or(config.monitor.healthy_threshold),
        channel.unhealthy_threshold.unwrap_or(config.monitor.unhealthy_threshold),
    )
    .map_err(|source| StartupError::Threshold {
        channel: channel.name.clone(),
        source,
    })
}

pub fn build_prober(config: &CheckerConfig, channel: &ChannelConfig) -> Result<Box<dyn Prober>, StartupError> {
    let timeout = Duration::from_millis(config.monitor.timeout_ms);
    let probe = &config.probe;

    let prober: Box<dyn Prober> = match channel.kind {
        ProbeKind::Tcp => Box::new(TcpProber::new(
            channel.target.clone(),
            probe.auth_token.clone(),
            probe.echo_payload.clone(),
            probe.expect.clone(),
            timeout,
        )),
        ProbeKind::Http => {
            let url = parse_http_url(&channel.target).map_err(|reason| StartupError::Url {
                url: channel.target.clone(),
                reason,
            })?;
            Box::new(HttpProber::new(url, &probe.auth_token, probe.expect.clone(), timeout)?)
        }
    };
    Ok(prober)
}

pub fn build_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, StartupError> {
    let notifier: Arc<dyn Notifier> = match config {
        NotifierConfig::Log => Arc::new(LogNotifier),
        NotifierConfig::Webhook {
            url,
            timeout_ms,
            max_attempts,
        } => {
            let parsed = parse_http_url(url).map_err(|reason| StartupError::Url {
                url: url.clone(),
                reason,
            })?;
            Arc::new(WebhookNotifier::new(parsed, Duration::from_millis(*timeout_ms), *max_attempts)?)
        }
        NotifierConfig::Email(email) => Arc::new(EmailNotifier::new(email)?),
    };
    Ok(notifier)
}

/// Build the monitor for every configured channel.
pub fn build_monitor(config: &CheckerConfig) -> Result<Monitor, StartupError> {
    let mut specs = Vec::with_capacity(config.channels.len());
    for channel in &config.channels {
        specs.push(ChannelSpec {
            channel: Channel::new(&channel.name),
            prober: build_prober(config, channel)?,
            thresholds: channel_thresholds(config, channel)?,
        });
    }

    let notifier = build_notifier(&config.notifier)?;
    Ok(Monitor::new(monitor_settings(config), specs, notifier))
}
