//! Single-task notification queue.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::notify::{Notifier, VerdictEvent};

/// Cheap handle drivers use to enqueue verdict changes.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::UnboundedSender<VerdictEvent>,
}

impl NotificationSender {
    /// Enqueue without waiting. Events are dropped once the dispatcher has stopped.
    pub fn send(&self, event: VerdictEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!(channel = %e.0.channel, "Notification dispatcher stopped, event dropped");
        }
    }
}

/// Drains the queue and hands each event to the configured [`Notifier`].
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    rx: mpsc::UnboundedReceiver<VerdictEvent>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> (Self, NotificationSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { notifier, rx }, NotificationSender { tx })
    }

    /// Deliver events in order until shutdown or until every sender is gone.
    ///
    /// Shutdown also cuts short a delivery in flight.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            let event = tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => event,
                    None => {
                        tracing::debug!("All notification senders dropped, dispatcher exiting");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!(pending = self.rx.len(), "Notification dispatcher received shutdown signal");
                    break;
                }
            };

            tokio::select! {
                _ = self.notifier.notify(&event) => {}
                _ = shutdown.recv() => {
                    tracing::info!(
                        channel = %event.channel,
                        pending = self.rx.len(),
                        "Notification dispatcher received shutdown signal, delivery abandoned"
                    );
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::health::{Channel, Verdict};
    use crate::lifecycle::Shutdown;

    #[derive(Default)]
    struct StalledNotifier {
        started: Notify,
        finished: AtomicBool,
    }

    #[async_trait]
    impl Notifier for StalledNotifier {
        async fn notify(&self, _event: &VerdictEvent) {
            self.started.notify_one();
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_delivery_in_flight() {
        let notifier = Arc::new(StalledNotifier::default());
        let (dispatcher, sender) = NotificationDispatcher::new(notifier.clone());
        let shutdown = Shutdown::new();
        let task = tokio::spawn(dispatcher.run(shutdown.subscribe()));

        sender.send(VerdictEvent::new(Channel::new("tcp"), Verdict::Down));
        notifier.started.notified().await;
        shutdown.trigger();

        let joined = tokio::time::timeout(Duration::from_secs(5), task).await;
        assert!(joined.is_ok(), "dispatcher must exit promptly on shutdown");
        assert!(!notifier.finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_exits_when_senders_dropped() {
        let notifier = Arc::new(StalledNotifier::default());
        let (dispatcher, sender) = NotificationDispatcher::new(notifier);
        let shutdown = Shutdown::new();
        let task = tokio::spawn(dispatcher.run(shutdown.subscribe()));

        drop(sender);
        assert!(tokio::time::timeout(Duration::from_secs(5), task).await.is_ok());
    }
}
