//! Log level definitions and the per-level filter mask

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// Names indexed by raw level value; slot 0 is the reserved unknown level.
pub const LEVEL_NAMES: [&str; 7] = ["UNKNW", "DEBUG", "INFO", "WARN", "DUMP", "ERROR", "FATAL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Dump = 4,
    Error = 5,
    Fatal = 6,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Dump,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        LEVEL_NAMES[*self as usize]
    }

    /// Lowercase name, used as the feature name of level destinations
    pub fn feature_name(&self) -> String {
        self.to_str().to_lowercase()
    }

    /// Bit of this level inside a [`LogFilter`] mask
    #[inline]
    pub fn bit(&self) -> u32 {
        1 << (*self as u32 - 1)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => White,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Dump => Green,
            LogLevel::Error => Red,
            LogLevel::Fatal => Red,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = LoggerError;

    fn try_from(value: u8) -> Result<Self, LoggerError> {
        match value {
            1 => Ok(LogLevel::Debug),
            2 => Ok(LogLevel::Info),
            3 => Ok(LogLevel::Warn),
            4 => Ok(LogLevel::Dump),
            5 => Ok(LogLevel::Error),
            6 => Ok(LogLevel::Fatal),
            other => Err(LoggerError::InvalidLevel(other)),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "DUMP" => Ok(LogLevel::Dump),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Bitmask of active levels, one bit per level (bit index = level - 1).
///
/// All levels are active by default. The mask is shared between the service
/// and every producer, so toggles take effect on the next emission.
#[derive(Debug)]
pub struct LogFilter {
    bits: AtomicU32,
}

impl LogFilter {
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(u32::MAX),
        }
    }

    /// Turn a level on or off
    pub fn filter(&self, level: LogLevel, on: bool) {
        if on {
            self.bits.fetch_or(level.bit(), Ordering::Relaxed);
        } else {
            self.bits.fetch_and(!level.bit(), Ordering::Relaxed);
        }
    }

    /// True when the level is filtered out
    #[inline]
    pub fn is_filter(&self, level: LogLevel) -> bool {
        self.bits.load(Ordering::Relaxed) & level.bit() == 0
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new()
    }
}
