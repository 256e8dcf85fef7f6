//! Metrics collection and exposition.
//!
//! # Metrics
//! - `checker_probes_total` (counter): probes by channel, outcome
//! - `checker_probe_duration_seconds` (histogram): probe latency by channel
//! - `checker_verdict` (gauge): 1=up, 0=down, -1=unknown
//! - `checker_verdict_changes_total` (counter): changes by channel, verdict
//! - `checker_notifications_failed_total` (counter): undelivered notifications
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::health::verdict::Verdict;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_probe(channel: &str, healthy: bool, started: Instant) {
    let outcome = if healthy { "success" } else { "failure" };
    counter!("checker_probes_total", "channel" => channel.to_string(), "outcome" => outcome).increment(1);
    histogram!("checker_probe_duration_seconds", "channel" => channel.to_string())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_verdict(channel: &str, verdict: Verdict) {
    gauge!("checker_verdict", "channel" => channel.to_string()).set(verdict.as_gauge());
}

pub fn record_verdict_change(channel: &str, verdict: Verdict) {
    counter!(
        "checker_verdict_changes_total",
        "channel" => channel.to_string(),
        "verdict" => verdict.as_str()
    )
    .increment(1);
    record_verdict(channel, verdict);
}

pub fn record_notification_failure(channel: &str) {
    counter!("checker_notifications_failed_total", "channel" => channel.to_string()).increment(1);
}
