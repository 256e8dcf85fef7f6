//! Channel identifiers and the verdict vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An independently monitored pathway to the target service (e.g. "tcp", "http").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Channel(String);

impl Channel {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Channel {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Externally visible health conclusion for a channel.
///
/// `Unknown` only exists before the first threshold crossing; afterwards a
/// channel is always `Up` or `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    #[default]
    Unknown,
    Up,
    Down,
}

impl Verdict {
    /// Gauge encoding used by the metrics exporter.
    pub fn as_gauge(self) -> f64 {
        match self {
            Verdict::Up => 1.0,
            Verdict::Down => 0.0,
            Verdict::Unknown => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Unknown => "UNKNOWN",
            Verdict::Up => "UP",
            Verdict::Down => "DOWN",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
