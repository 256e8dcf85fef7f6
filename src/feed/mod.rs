//! Status feed subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP GET /rss | /status
//!     → server.rs (axum handlers)
//!     → StatusStore::snapshot()
//!     → rss.rs (RSS 2.0) | JSON
//! ```

pub mod rss;
pub mod server;

pub use rss::FeedMeta;
pub use server::{router, serve, FeedPublisher};
