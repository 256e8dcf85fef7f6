//! Notifier that only writes to the log.

use async_trait::async_trait;

use crate::health::verdict::Verdict;
use crate::notify::{Notifier, VerdictEvent};

#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &VerdictEvent) {
        match event.verdict {
            Verdict::Down => tracing::warn!(
                channel = %event.channel,
                event_id = %event.id,
                "Service {}", event.summary()
            ),
            _ => tracing::info!(
                channel = %event.channel,
                event_id = %event.id,
                "Service {}", event.summary()
            ),
        }
    }
}
