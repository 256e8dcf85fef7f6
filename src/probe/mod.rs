//! Probe subsystem.
//!
//! # Data Flow
//! ```text
//! Channel driver tick
//!     → Prober::check() (tcp.rs / http.rs)
//!     → ProbeOutcome { healthy, detail }
//!     → HysteresisTracker::observe(healthy)
//! ```
//!
//! # Design Decisions
//! - Expected failures (refused, timeout, bad reply) become `healthy = false`;
//!   nothing in this module returns an error
//! - `detail` is for logs only and never steers control flow
//! - The driver bounds every check with the configured timeout; probers
//!   also apply it to their own I/O so sockets are released promptly

pub mod http;
pub mod tcp;

use async_trait::async_trait;

pub use http::HttpProber;
pub use tcp::TcpProber;

/// Result of a single health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub healthy: bool,
    pub detail: String,
}

impl ProbeOutcome {
    pub fn healthy(detail: impl Into<String>) -> Self {
        Self {
            healthy: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            detail: detail.into(),
        }
    }
}

/// One health check against a fixed target.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Human-readable target, for logs.
    fn target(&self) -> &str;

    /// Run one check. Must not panic or error on expected network failures.
    async fn check(&self) -> ProbeOutcome;
}
