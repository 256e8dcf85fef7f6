//! Bounded redelivery shared by the network notifiers.

use std::future::Future;

use crate::notify::{NotifyError, VerdictEvent};
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;

/// Run `attempt` until it succeeds or `max_attempts` is used up.
///
/// Final failure is logged and counted. Returns whether the event was delivered.
pub(crate) async fn deliver_with_retry<F, Fut>(
    sink: &'static str,
    event: &VerdictEvent,
    max_attempts: u32,
    backoff: &Backoff,
    mut attempt: F,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), NotifyError>>,
{
    let max_attempts = max_attempts.max(1);
    for n in 1..=max_attempts {
        match attempt().await {
            Ok(()) => {
                tracing::info!(sink, channel = %event.channel, verdict = %event.verdict, attempt = n, "Notification delivered");
                return true;
            }
            Err(e) if n < max_attempts => {
                let delay = backoff.delay(n);
                tracing::warn!(sink, channel = %event.channel, attempt = n, delay = ?delay, error = %e, "Notification delivery failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::error!(sink, channel = %event.channel, verdict = %event.verdict, attempt = n, error = %e, "Notification delivery failed, giving up");
            }
        }
    }
    metrics::record_notification_failure(event.channel.as_str());
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Channel, Verdict};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn quick() -> Backoff {
        Backoff::new(Duration::from_millis(1), Duration::from_millis(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_first_success() {
        let event = VerdictEvent::new(Channel::new("tcp"), Verdict::Down);
        let calls = AtomicU32::new(0);

        let delivered = deliver_with_retry("test", &event, 5, &quick(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 2 {
                    Err(NotifyError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(delivered);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let event = VerdictEvent::new(Channel::new("http"), Verdict::Up);
        let calls = AtomicU32::new(0);

        let delivered = deliver_with_retry("test", &event, 3, &quick(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(NotifyError::Status(reqwest::StatusCode::BAD_GATEWAY)) }
        })
        .await;

        assert!(!delivered);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
