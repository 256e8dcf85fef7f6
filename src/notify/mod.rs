//! Notification subsystem.
//!
//! # Data Flow
//! ```text
//! ChannelDriver (verdict changed)
//!     → NotificationSender::send(VerdictEvent)   (non-blocking enqueue)
//!     → NotificationDispatcher (single task, FIFO)
//!     → Notifier::notify()                       (log.rs / webhook.rs / email.rs)
//! ```
//!
//! # Design Decisions
//! - Drivers never await delivery; a slow or failing sink cannot stall probing
//! - One dispatcher keeps per-channel event order
//! - Delivery failures are retried, then logged and counted; they go no further

pub mod dispatcher;
pub mod email;
pub mod log;
mod retry;
pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::health::verdict::{Channel, Verdict};

pub use dispatcher::{NotificationDispatcher, NotificationSender};
pub use email::EmailNotifier;
pub use self::log::LogNotifier;
pub use webhook::WebhookNotifier;

/// A confirmed verdict change, as handed to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictEvent {
    pub id: Uuid,
    pub channel: Channel,
    pub verdict: Verdict,
    pub at: DateTime<Utc>,
}

impl VerdictEvent {
    pub fn new(channel: Channel, verdict: Verdict) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            verdict,
            at: Utc::now(),
        }
    }

    /// One-line summary, e.g. `tcp is DOWN`.
    pub fn summary(&self) -> String {
        format!("{} is {}", self.channel, self.verdict)
    }
}

/// Delivery failure inside a notifier.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("receiver answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("message could not be built: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Out-of-band sink for verdict changes.
///
/// Fire-and-forget from the caller's side: implementations log their own
/// failures and never propagate them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &VerdictEvent);
}
