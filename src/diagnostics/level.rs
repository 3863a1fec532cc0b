// SPDX-License-Identifier: MPL-2.0
//! Trace levels.
//!
//! Lower values are more severe. A message is emitted when its level is at or
//! below every threshold that applies to it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric trace level.
///
/// The named constants leave gaps so intermediate levels can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceLevel(u32);

impl TraceLevel {
    pub const ERROR: TraceLevel = TraceLevel(10);
    pub const WARNING: TraceLevel = TraceLevel(20);
    pub const INFO: TraceLevel = TraceLevel(30);
    /// Request and interface level tracing.
    pub const API: TraceLevel = TraceLevel(40);
    pub const VERBOSE: TraceLevel = TraceLevel(50);

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Maps the level onto the `log` facade.
    #[must_use]
    pub fn log_level(self) -> log::Level {
        match self.0 {
            0..=10 => log::Level::Error,
            11..=20 => log::Level::Warn,
            21..=30 => log::Level::Info,
            31..=40 => log::Level::Debug,
            _ => log::Level::Trace,
        }
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TraceLevel::ERROR => write!(f, "ERROR"),
            TraceLevel::WARNING => write!(f, "WARNING"),
            TraceLevel::INFO => write!(f, "INFO"),
            TraceLevel::API => write!(f, "API"),
            TraceLevel::VERBOSE => write!(f, "VERBOSE"),
            TraceLevel(value) => write!(f, "LEVEL{}", value),
        }
    }
}
