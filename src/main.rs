//! sre-checker
//!
//! Probes a remote service over independent channels (raw TCP, HTTPS) and turns
//! flaky probe results into a stable UP/DOWN verdict per channel.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── per channel task ────────────────────────────┐
//!   │                                                                          │
//!   │  Prober::check() ─▶ HysteresisTracker::observe() ─▶ sleep(interval)      │
//!   │  (timeout-bounded)              │                         │              │
//!   │        ▲                        │ on threshold crossing   │              │
//!   │        │                        ▼                         │              │
//!   │        │         StatusStore::update + notify queue       │              │
//!   │        └──────────────────────────────────────────────────┘              │
//!   └──────────────────────────────────────────────────────────────────────────┘
//!                                   │                       │
//!                                   ▼                       ▼
//!                        Feed server (/rss, /status)   Notification dispatcher
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use sre_checker::config::{self, ChannelConfig, CheckerConfig, EmailConfig, NotifierConfig, ProbeKind};
use sre_checker::feed::{self, FeedPublisher};
use sre_checker::lifecycle::{signals, startup, Shutdown};
use sre_checker::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "sre-checker")]
#[command(about = "Track service health over TCP and HTTP channels", long_about = None)]
struct Cli {
    /// Config file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Monitor a TCP service at host:port as channel "tcp".
    #[arg(long)]
    tcp_target: Option<String>,

    /// Monitor an HTTP(S) endpoint URL as channel "http".
    #[arg(long)]
    http_target: Option<String>,

    /// Pause between probes, in milliseconds.
    #[arg(long)]
    check_interval_ms: Option<u64>,

    /// Probe timeout, in milliseconds.
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Consecutive successes required to confirm UP.
    #[arg(long)]
    healthy_threshold: Option<u32>,

    /// Consecutive failures required to confirm DOWN.
    #[arg(long)]
    unhealthy_threshold: Option<u32>,

    /// Serve the RSS status feed.
    #[arg(long)]
    feed: bool,

    /// Feed bind address.
    #[arg(long)]
    feed_address: Option<String>,

    /// Deliver verdict changes to this webhook URL.
    #[arg(long)]
    notify_webhook: Option<String>,

    /// Mail verdict changes to this address (SMTP settings from the environment).
    #[arg(long)]
    notify_email: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut CheckerConfig) {
        if let Some(target) = &self.tcp_target {
            config.channels.push(ChannelConfig::new("tcp", ProbeKind::Tcp, target.clone()));
        }
        if let Some(target) = &self.http_target {
            config.channels.push(ChannelConfig::new("http", ProbeKind::Http, target.clone()));
        }
        if let Some(v) = self.check_interval_ms {
            config.monitor.check_interval_ms = v;
        }
        if let Some(v) = self.timeout_ms {
            config.monitor.timeout_ms = v;
        }
        if let Some(v) = self.healthy_threshold {
            config.monitor.healthy_threshold = v;
        }
        if let Some(v) = self.unhealthy_threshold {
            config.monitor.unhealthy_threshold = v;
        }
        if self.feed {
            config.feed.enabled = true;
        }
        if let Some(addr) = &self.feed_address {
            config.feed.bind_address = addr.clone();
        }
        if let Some(url) = &self.notify_webhook {
            config.notifier = NotifierConfig::Webhook {
                url: url.clone(),
                timeout_ms: 10_000,
                max_attempts: 3,
            };
        }
        if let Some(recipient) = &self.notify_email {
            match &mut config.notifier {
                NotifierConfig::Email(email) => email.to = recipient.clone(),
                other => *other = NotifierConfig::Email(EmailConfig::for_recipient(recipient.clone())),
            }
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

/// Environment overrides only carry secrets and SMTP settings, none of which
/// have a flag, so they are applied after the CLI to reach a notifier the CLI chose.
fn load(cli: &Cli) -> Result<CheckerConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::loader::read_config(path)?,
        None => CheckerConfig::default(),
    };
    cli.apply(&mut config);
    config::loader::apply_env_overrides(&mut config);
    config::finalize(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sre-checker: {}", e);
            std::process::exit(2);
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!("sre-checker v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        channels = config.channels.len(),
        check_interval_ms = config.monitor.check_interval_ms,
        timeout_ms = config.monitor.timeout_ms,
        healthy_threshold = config.monitor.healthy_threshold,
        unhealthy_threshold = config.monitor.unhealthy_threshold,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }

    let monitor = startup::build_monitor(&config)?;
    let store = monitor.store();
    let shutdown = Shutdown::new();

    let feed_task = if config.feed.enabled {
        let listener = TcpListener::bind(&config.feed.bind_address).await?;
        let publisher = Arc::new(FeedPublisher::from_config(store.clone(), &config));
        let router = feed::router(publisher, Duration::from_secs(config.feed.request_timeout_secs));
        let signalled = shutdown.signalled();
        Some(tokio::spawn(async move {
            if let Err(e) = feed::serve(listener, router, signalled).await {
                tracing::error!(error = %e, "Feed server failed");
            }
        }))
    } else {
        None
    };

    let handle = monitor.spawn(&shutdown);

    signals::wait_for_termination().await;
    shutdown.trigger();

    let grace = Duration::from_millis(config.monitor.shutdown_grace_ms);
    if !handle.join(grace).await {
        tracing::warn!("Forced shutdown of remaining channel loops");
    }
    if let Some(task) = feed_task {
        if tokio::time::timeout(grace, task).await.is_err() {
            tracing::warn!("Feed server did not stop within grace period");
        }
    }

    for status in store.snapshot().channels {
        tracing::info!(channel = %status.channel, verdict = %status.verdict, "Final verdict");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sre_checker::config::validation::ValidationError;
    use sre_checker::config::ConfigError;

    #[test]
    fn test_targets_from_flags_need_no_config_file() {
        let cli = Cli::parse_from([
            "sre-checker",
            "--tcp-target",
            "service.example.com:3000",
            "--http-target",
            "https://service.example.com/",
            "--unhealthy-threshold",
            "2",
        ]);

        let config = load(&cli).unwrap();
        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[0].name, "tcp");
        assert_eq!(config.channels[0].kind, ProbeKind::Tcp);
        assert_eq!(config.channels[0].target, "service.example.com:3000");
        assert_eq!(config.channels[1].name, "http");
        assert_eq!(config.channels[1].kind, ProbeKind::Http);
        assert_eq!(config.monitor.unhealthy_threshold, 2);
    }

    #[test]
    fn test_no_targets_and_no_file_is_rejected() {
        let cli = Cli::parse_from(["sre-checker"]);
        match load(&cli) {
            Err(ConfigError::Validation(errors)) => assert!(errors.contains(&ValidationError::NoChannels)),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_target_flag_is_rejected() {
        let cli = Cli::parse_from(["sre-checker", "--tcp-target", "service.example.com"]);
        assert!(matches!(load(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_notify_email_selects_email_notifier() {
        let cli = Cli::parse_from(["sre-checker", "--notify-email", "ops@example.com"]);
        let mut config = CheckerConfig::default();
        cli.apply(&mut config);

        match config.notifier {
            NotifierConfig::Email(email) => {
                assert_eq!(email.to, "ops@example.com");
                assert_eq!(email.smtp_port, 587);
            }
            other => panic!("unexpected notifier {:?}", other),
        }
    }
}
