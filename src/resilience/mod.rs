//! Resilience helpers.
//!
//! The core loops never retry; a failed probe is simply a `false` outcome.
//! Backoff is only used by collaborators that own their own redelivery,
//! such as the webhook and email notifiers.

pub mod backoff;
