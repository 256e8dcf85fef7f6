//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the checker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the checker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CheckerConfig {
    /// Polling cadence and hysteresis thresholds.
    pub monitor: MonitorConfig,

    /// Probe protocol settings shared by every channel.
    pub probe: ProbeConfig,

    /// Monitored channels, one polling loop each.
    pub channels: Vec<ChannelConfig>,

    /// Where verdict changes are delivered.
    pub notifier: NotifierConfig,

    /// Status feed server.
    pub feed: FeedConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Polling and hysteresis configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Pause between the end of one probe and the start of the next, in milliseconds.
    pub check_interval_ms: u64,

    /// Upper bound for a single probe, in milliseconds.
    pub timeout_ms: u64,

    /// Number of consecutive successes before marking a channel up.
    pub healthy_threshold: u32,

    /// Number of consecutive failures before marking a channel down.
    pub unhealthy_threshold: u32,

    /// How long shutdown waits for loops to exit, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: 5_000,
            timeout_ms: 4_000,
            healthy_threshold: 5,
            unhealthy_threshold: 5,
            shutdown_grace_ms: 5_000,
        }
    }
}

/// Probe protocol configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Token sent with every probe. Overridden by `SRE_CHECKER_AUTH_TOKEN`.
    pub auth_token: String,

    /// Marker the service reply must contain (empty accepts any reply).
    pub expect: String,

    /// Message sent by the TCP probe after authenticating.
    pub echo_payload: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            auth_token: String::new(),
            expect: String::new(),
            echo_payload: "Testing".to_string(),
        }
    }
}

/// Probe protocol of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// Raw TCP auth + echo exchange; target is `host:port`.
    Tcp,
    /// HTTP(S) GET; target is an absolute URL.
    Http,
}

/// A monitored channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Unique channel identifier used in logs, metrics and the feed.
    pub name: String,

    /// Probe protocol.
    pub kind: ProbeKind,

    /// `host:port` for TCP, absolute URL for HTTP.
    pub target: String,

    /// Link shown in the feed (defaults to the target).
    #[serde(default)]
    pub link: Option<String>,

    /// Per-channel override of `monitor.healthy_threshold`.
    #[serde(default)]
    pub healthy_threshold: Option<u32>,

    /// Per-channel override of `monitor.unhealthy_threshold`.
    #[serde(default)]
    pub unhealthy_threshold: Option<u32>,
}

impl ChannelConfig {
    pub fn new(name: impl Into<String>, kind: ProbeKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            link: None,
            healthy_threshold: None,
            unhealthy_threshold: None,
        }
    }

    pub fn link(&self) -> &str {
        self.link.as_deref().unwrap_or(&self.target)
    }
}

/// Notification sink configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NotifierConfig {
    /// Write verdict changes to the log only.
    #[default]
    Log,
    /// POST verdict changes as JSON.
    Webhook {
        url: String,
        #[serde(default = "default_notify_timeout_ms")]
        timeout_ms: u64,
        #[serde(default = "default_notify_attempts")]
        max_attempts: u32,
    },
    /// Mail verdict changes over SMTP.
    Email(EmailConfig),
}

fn default_notify_timeout_ms() -> u64 {
    10_000
}

fn default_notify_attempts() -> u32 {
    3
}

/// SMTP delivery settings. Host and credentials are usually supplied via
/// `SRE_CHECKER_SMTP_HOST`, `SRE_CHECKER_SMTP_USER` and `SRE_CHECKER_SMTP_PASSWORD`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Recipient mailbox.
    pub to: String,

    /// Sender mailbox.
    pub from: String,

    pub smtp_host: String,

    pub smtp_port: u16,

    pub smtp_user: String,

    pub smtp_password: String,

    /// Upgrade the connection with STARTTLS. Disable only for local relays.
    pub starttls: bool,

    pub timeout_ms: u64,

    pub max_attempts: u32,
}

impl EmailConfig {
    pub fn for_recipient(recipient: impl Into<String>) -> Self {
        Self {
            to: recipient.into(),
            ..Self::default()
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            to: String::new(),
            from: "sre-checker@sre-checker.local".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_password: String::new(),
            starttls: true,
            timeout_ms: default_notify_timeout_ms(),
            max_attempts: default_notify_attempts(),
        }
    }
}

/// Status feed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Serve `/rss` and `/status`.
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Feed title.
    pub title: String,

    /// Feed description.
    pub description: String,

    /// Feed self link.
    pub link: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "0.0.0.0:8080".to_string(),
            title: "Service Status Monitor".to_string(),
            description: "Current status of the monitored service channels.".to_string(),
            link: "/rss".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
