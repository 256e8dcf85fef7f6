//! Webhook notifier.
//!
//! POSTs a JSON document per verdict change:
//! `{"id", "channel", "verdict", "text", "at"}`.
//! Redelivery is bounded by `max_attempts` with jittered exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::notify::retry::deliver_with_retry;
use crate::notify::{Notifier, NotifyError, VerdictEvent};
use crate::resilience::backoff::Backoff;

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(flatten)]
    event: &'a VerdictEvent,
    text: String,
}

/// Delivers verdict changes to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: Url,
    client: Client,
    max_attempts: u32,
    backoff: Backoff,
}

impl WebhookNotifier {
    pub fn new(url: Url, timeout: Duration, max_attempts: u32) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sre-checker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            url,
            client,
            max_attempts: max_attempts.max(1),
            backoff: Backoff::default(),
        })
    }

    /// Replace the redelivery delay policy.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    async fn deliver(&self, event: &VerdictEvent) -> Result<(), NotifyError> {
        let payload = Payload {
            event,
            text: event.summary(),
        };
        let response = self.client.post(self.url.clone()).json(&payload).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Status(status))
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &VerdictEvent) {
        deliver_with_retry("webhook", event, self.max_attempts, &self.backoff, move || self.deliver(event)).await;
    }
}
