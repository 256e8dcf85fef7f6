//! Health verdict subsystem.
//!
//! # Data Flow
//! ```text
//! driver.rs (one task per channel):
//!     Prober::check() bounded by timeout
//!     → tracker.rs observe(outcome)
//!     → on crossing: store.rs update + notify queue
//!     → sleep interval, then probe again
//!
//! store.rs:
//!     Channel → Verdict, read by the feed publisher via snapshot()
//!
//! tracker.rs (state machine):
//!     Unknown → Up/Down, then Up ←→ Down
//!     With thresholds to prevent flapping
//! ```
//!
//! # Design Decisions
//! - State transitions require consecutive successes/failures
//! - Tracker state is owned by exactly one driver; only the store is shared
//! - Health state is per-channel, channels never affect each other

pub mod driver;
pub mod store;
pub mod tracker;
pub mod verdict;

pub use driver::{ChannelDriver, ChannelSpec, Monitor, MonitorHandle, MonitorSettings};
pub use store::{ChannelStatus, StatusRecord, StatusStore};
pub use tracker::{HysteresisTracker, ThresholdError, Thresholds, VerdictChange};
pub use verdict::{Channel, Verdict};
