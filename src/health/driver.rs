//! Per-channel polling loops.
//!
//! # Responsibilities
//! - Probe each channel on its own schedule
//! - Feed outcomes to that channel's tracker, strictly in completion order
//! - On a verdict change: update the status store, then enqueue a notification
//! - Exit promptly on the global shutdown signal
//!
//! # Design Decisions
//! - One spawned task per channel; loops share nothing but the status store
//! - Every probe is bounded by the configured timeout; overrunning counts as failure
//! - Shutdown is checked at both the probe and the sleep boundary; a probe
//!   in flight is dropped, which closes its socket
//! - Sleep follows the probe, so probes of one channel never overlap

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time;
use tracing::Instrument;

use crate::health::store::StatusStore;
use crate::health::tracker::{HysteresisTracker, Thresholds, VerdictChange};
use crate::health::verdict::{Channel, Verdict};
use crate::lifecycle::Shutdown;
use crate::notify::{NotificationDispatcher, NotificationSender, Notifier, VerdictEvent};
use crate::observability::metrics;
use crate::probe::{ProbeOutcome, Prober};

/// Timing shared by every channel loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub check_interval: Duration,
    pub timeout: Duration,
}

/// Everything needed to monitor one channel.
pub struct ChannelSpec {
    pub channel: Channel,
    pub prober: Box<dyn Prober>,
    pub thresholds: Thresholds,
}

/// The loop driving a single channel.
pub struct ChannelDriver {
    channel: Channel,
    prober: Box<dyn Prober>,
    tracker: HysteresisTracker,
    store: Arc<StatusStore>,
    notifications: NotificationSender,
    settings: MonitorSettings,
}

impl ChannelDriver {
    pub fn new(
        spec: ChannelSpec,
        store: Arc<StatusStore>,
        notifications: NotificationSender,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            channel: spec.channel,
            prober: spec.prober,
            tracker: HysteresisTracker::new(spec.thresholds),
            store,
            notifications,
            settings,
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn tracker(&self) -> &HysteresisTracker {
        &self.tracker
    }

    async fn probe(&self) -> ProbeOutcome {
        let started = Instant::now();
        let outcome = match time::timeout(self.settings.timeout, self.prober.check()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(timeout = ?self.settings.timeout, "Probe exceeded timeout");
                ProbeOutcome::failed(format!("no result within {:?}", self.settings.timeout))
            }
        };
        metrics::record_probe(self.channel.as_str(), outcome.healthy, started);
        outcome
    }

    /// Apply one probe outcome. Returns the verdict change, if any.
    pub fn apply(&mut self, outcome: &ProbeOutcome) -> Option<VerdictChange> {
        let change = self.tracker.observe(outcome.healthy);

        tracing::debug!(
            healthy = outcome.healthy,
            successes = self.tracker.consecutive_successes(),
            failures = self.tracker.consecutive_failures(),
            verdict = %self.tracker.verdict(),
            "Probe observed"
        );

        let change = change?;
        self.store.update(&self.channel, change.to);
        metrics::record_verdict_change(self.channel.as_str(), change.to);

        match change.to {
            Verdict::Down => tracing::warn!(from = %change.from, to = %change.to, "Verdict changed"),
            _ => tracing::info!(from = %change.from, to = %change.to, "Verdict changed"),
        }

        self.notifications.send(VerdictEvent::new(self.channel.clone(), change.to));
        Some(change)
    }

    /// Probe once and apply the outcome.
    pub async fn poll_once(&mut self) -> Option<VerdictChange> {
        let outcome = self.probe().await;
        self.apply(&outcome)
    }

    /// Run until the shutdown signal fires (or its sender is dropped).
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let thresholds = self.tracker.thresholds();
        tracing::info!(
            probe_target = %self.prober.target(),
            interval = ?self.settings.check_interval,
            timeout = ?self.settings.timeout,
            healthy_threshold = thresholds.healthy(),
            unhealthy_threshold = thresholds.unhealthy(),
            "Channel driver starting"
        );
        metrics::record_verdict(self.channel.as_str(), self.tracker.verdict());

        loop {
            let outcome = tokio::select! {
                outcome = self.probe() => outcome,
                _ = shutdown.recv() => break,
            };
            self.apply(&outcome);

            tokio::select! {
                _ = time::sleep(self.settings.check_interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!("Channel driver received shutdown signal, exiting loop");
    }
}

/// All channel loops plus the notification dispatcher, ready to spawn.
pub struct Monitor {
    store: Arc<StatusStore>,
    drivers: Vec<ChannelDriver>,
    dispatcher: NotificationDispatcher,
}

impl Monitor {
    pub fn new(settings: MonitorSettings, specs: Vec<ChannelSpec>, notifier: Arc<dyn Notifier>) -> Self {
        let store = Arc::new(StatusStore::new(specs.iter().map(|s| s.channel.clone())));
        let (dispatcher, notifications) = NotificationDispatcher::new(notifier);

        let drivers = specs
            .into_iter()
            .map(|spec| ChannelDriver::new(spec, store.clone(), notifications.clone(), settings))
            .collect();

        Self {
            store,
            drivers,
            dispatcher,
        }
    }

    /// Shared status store read by the feed publisher.
    pub fn store(&self) -> Arc<StatusStore> {
        self.store.clone()
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.drivers.iter().map(|d| d.channel().clone()).collect()
    }

    /// Spawn one task per channel and the dispatcher, all bound to `shutdown`.
    pub fn spawn(self, shutdown: &Shutdown) -> MonitorHandle {
        let mut tasks = JoinSet::new();

        for driver in self.drivers {
            let span = tracing::info_span!("monitor", channel = %driver.channel());
            tasks.spawn(driver.run(shutdown.subscribe()).instrument(span));
        }
        tasks.spawn(self.dispatcher.run(shutdown.subscribe()));

        tracing::info!(tasks = tasks.len(), "Monitor started");
        MonitorHandle { tasks }
    }
}

/// Join handle over every spawned monitor task.
pub struct MonitorHandle {
    tasks: JoinSet<()>,
}

impl MonitorHandle {
    /// Number of tasks not yet joined.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task to finish, aborting stragglers after `deadline`.
    /// Returns `true` when all tasks exited on their own.
    pub async fn join(mut self, deadline: Duration) -> bool {
        let drained = time::timeout(deadline, async {
            while let Some(res) = self.tasks.join_next().await {
                if let Err(e) = res {
                    tracing::error!(error = %e, "Monitor task ended abnormally");
                }
            }
        })
        .await
        .is_ok();

        if !drained {
            tracing::warn!(remaining = self.tasks.len(), "Monitor tasks still running after deadline, aborting");
            self.tasks.abort_all();
        }
        drained
    }
}
