//! Shared status record.
//!
//! # Responsibilities
//! - Hold the last known verdict per channel
//! - Accept updates from each channel's driver
//! - Hand out point-in-time snapshots to any number of readers
//!
//! # Design Decisions
//! - Channel set is fixed at construction; no map mutation after startup
//! - One `ArcSwap` slot per channel: writers for different channels never
//!   contend and readers never block or see a half-written status
//! - No cross-channel ordering: a snapshot may mix moments per channel

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::verdict::{Channel, Verdict};

/// Status of a single channel as seen by readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub channel: Channel,
    pub verdict: Verdict,
    /// Time of the last verdict change; `None` while still `Unknown`.
    pub since: Option<DateTime<Utc>>,
}

impl ChannelStatus {
    fn unknown(channel: Channel) -> Self {
        Self {
            channel,
            verdict: Verdict::Unknown,
            since: None,
        }
    }
}

/// Point-in-time copy of every channel's status, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub channels: Vec<ChannelStatus>,
}

impl StatusRecord {
    pub fn get(&self, channel: &str) -> Option<&ChannelStatus> {
        self.channels.iter().find(|s| s.channel.as_str() == channel)
    }

    pub fn verdict(&self, channel: &str) -> Option<Verdict> {
        self.get(channel).map(|s| s.verdict)
    }
}

#[derive(Debug)]
struct Slot {
    channel: Channel,
    status: ArcSwap<ChannelStatus>,
}

/// Concurrency-safe store of the last verdict per channel.
#[derive(Debug)]
pub struct StatusStore {
    slots: Vec<Slot>,
}

impl StatusStore {
    /// Create a store with every channel starting at `Unknown`.
    ///
    /// Duplicate channel names keep only the first registration.
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Self {
        let mut slots: Vec<Slot> = Vec::new();
        for channel in channels {
            if slots.iter().any(|s| s.channel == channel) {
                tracing::warn!(channel = %channel, "Duplicate channel ignored by status store");
                continue;
            }
            slots.push(Slot {
                status: ArcSwap::from_pointee(ChannelStatus::unknown(channel.clone())),
                channel,
            });
        }
        Self { slots }
    }

    fn slot(&self, channel: &Channel) -> Option<&Slot> {
        self.slots.iter().find(|s| s.channel == *channel)
    }

    /// Record a new verdict for `channel`. Returns `false` for unregistered channels.
    pub fn update(&self, channel: &Channel, verdict: Verdict) -> bool {
        let Some(slot) = self.slot(channel) else {
            tracing::warn!(channel = %channel, verdict = %verdict, "Update for unregistered channel ignored");
            return false;
        };

        slot.status.store(Arc::new(ChannelStatus {
            channel: channel.clone(),
            verdict,
            since: Some(Utc::now()),
        }));
        true
    }

    /// Current status of one channel.
    pub fn get(&self, channel: &Channel) -> Option<ChannelStatus> {
        self.slot(channel).map(|s| ChannelStatus::clone(&s.status.load()))
    }

    /// Copy of every channel's status.
    pub fn snapshot(&self) -> StatusRecord {
        StatusRecord {
            channels: self
                .slots
                .iter()
                .map(|s| ChannelStatus::clone(&s.status.load()))
                .collect(),
        }
    }

    /// Registered channels in registration order.
    pub fn channels(&self) -> Vec<Channel> {
        self.slots.iter().map(|s| s.channel.clone()).collect()
    }
}
