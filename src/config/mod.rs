//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → config file, TOML (loader.rs)
//!     → CLI flag overrides (main.rs)
//!     → environment overrides: auth token, SMTP host/credentials (loader.rs)
//!     → validation.rs (semantic checks, all errors at once)
//!     → CheckerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; thresholds and intervals never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{finalize, load_config, parse_config, ConfigError};
pub use schema::{
    ChannelConfig, CheckerConfig, EmailConfig, FeedConfig, MonitorConfig, NotifierConfig, ObservabilityConfig, ProbeConfig,
    ProbeKind,
};
