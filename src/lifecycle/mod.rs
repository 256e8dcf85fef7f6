//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Probers + Notifier → Monitor → spawn loops
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast to every loop → join with deadline → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then monitor, then feed listener
//! - Shutdown has timeout: stragglers are aborted after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
