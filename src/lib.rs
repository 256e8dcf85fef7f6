//! Service health checker with hysteresis-debounced verdicts.

pub mod config;
pub mod feed;
pub mod health;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod probe;
pub mod resilience;

pub use config::CheckerConfig;
pub use health::{Monitor, StatusStore, Verdict};
pub use lifecycle::Shutdown;
