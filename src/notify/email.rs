//! SMTP notifier.
//!
//! Sends one plain-text mail per verdict change, subject `<channel> is <VERDICT>`.
//! Redelivery follows the same bounded backoff as the webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;

use crate::config::EmailConfig;
use crate::notify::retry::deliver_with_retry;
use crate::notify::{Notifier, NotifyError, VerdictEvent};
use crate::resilience::backoff::Backoff;

/// Email notifier setup failure.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid mailbox '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("SMTP transport: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

fn mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address.parse().map_err(|source| EmailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Build the mail announcing `event`.
pub fn compose_message(from: &Mailbox, to: &Mailbox, event: &VerdictEvent) -> Result<Message, lettre::error::Error> {
    let body = format!(
        "Channel {} is {} as of {}.\r\n",
        event.channel,
        event.verdict,
        event.at.to_rfc2822()
    );

    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(event.summary())
        .header(ContentType::TEXT_PLAIN)
        .body(body)
}

/// Mails verdict changes to a single recipient.
pub struct EmailNotifier {
    from: Mailbox,
    to: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    max_attempts: u32,
    backoff: Backoff,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from = mailbox(&config.from)?;
        let to = mailbox(&config.to)?;

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
        };
        builder = builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_millis(config.timeout_ms)));
        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(config.smtp_user.clone(), config.smtp_password.clone()));
        }

        Ok(Self {
            from,
            to,
            transport: builder.build(),
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::default(),
        })
    }

    /// Replace the redelivery delay policy.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    async fn deliver(&self, event: &VerdictEvent) -> Result<(), NotifyError> {
        let message = compose_message(&self.from, &self.to, event)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, event: &VerdictEvent) {
        deliver_with_retry("email", event, self.max_attempts, &self.backoff, move || self.deliver(event)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Channel, Verdict};

    #[test]
    fn test_message_announces_change() {
        let from: Mailbox = "sre-checker@example.com".parse().unwrap();
        let to: Mailbox = "ops@example.com".parse().unwrap();
        let event = VerdictEvent::new(Channel::new("tcp"), Verdict::Down);

        let message = compose_message(&from, &to, &event).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: sre-checker@example.com"), "{}", raw);
        assert!(raw.contains("To: ops@example.com"), "{}", raw);
        assert!(raw.contains("Subject: tcp is DOWN"), "{}", raw);
        assert!(raw.contains("Content-Type: text/plain"), "{}", raw);
        assert!(raw.contains("Channel tcp is DOWN as of "), "{}", raw);
    }

    #[test]
    fn test_bad_recipient_is_rejected() {
        let config = EmailConfig {
            smtp_host: "localhost".into(),
            ..EmailConfig::for_recipient("not an address")
        };
        let err = EmailNotifier::new(&config).err().expect("recipient must be a mailbox");
        assert!(matches!(err, EmailError::Address { ref address, .. } if address == "not an address"));
    }
}
