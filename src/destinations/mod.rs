//! Destination implementations
//!
//! The set of sinks is closed: console, rolling mapped file and fixed mapped
//! file. [`Destination`] dispatches to them by `match`.

pub mod fixed_file;
pub mod format;
pub mod mapped_file;
pub mod rolling_file;
pub mod stdout;

pub use fixed_file::FixedFileDest;
pub use format::LineFormat;
pub use mapped_file::{MappedFile, PAGE_SIZE};
pub use rolling_file::{cleanup_expired, RollingFileDest, RollingType};
pub use stdout::StdoutDest;

use crate::core::{LogLevel, LogMessage, Result};
use std::time::Duration;

/// A sink that formats and persists records
pub enum Destination {
    Stdout(StdoutDest),
    Rolling(RollingFileDest),
    File(FixedFileDest),
}

impl Destination {
    pub fn write(&mut self, msg: &LogMessage) -> Result<()> {
        match self {
            Destination::Stdout(dest) => dest.write(msg),
            Destination::Rolling(dest) => dest.write(msg),
            Destination::File(dest) => dest.write(msg),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        match self {
            Destination::Stdout(dest) => dest.flush(),
            Destination::Rolling(dest) => dest.flush(),
            Destination::File(dest) => dest.flush(),
        }
    }

    pub fn ignore_prefix(&mut self, ignore: bool) {
        self.format_mut().ignore_prefix(ignore);
    }

    pub fn ignore_suffix(&mut self, ignore: bool) {
        self.format_mut().ignore_suffix(ignore);
    }

    /// Only rolling files expire; other destinations ignore this
    pub fn set_clean_time(&mut self, clean_time: Duration) {
        if let Destination::Rolling(dest) = self {
            dest.set_clean_time(clean_time);
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Destination::Stdout(_) => "stdout",
            Destination::Rolling(dest) => dest.feature(),
            Destination::File(dest) => dest.feature(),
        }
    }

    fn format_mut(&mut self) -> &mut LineFormat {
        match self {
            Destination::Stdout(dest) => dest.format_mut(),
            Destination::Rolling(dest) => dest.format_mut(),
            Destination::File(dest) => dest.format_mut(),
        }
    }
}

/// Which destination a setting applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DestTarget {
    /// The service's own rolling file
    Main,
    Console,
    /// A destination registered with `add_dest` or `add_file_dest`
    Feature(String),
    /// A destination registered with `add_lvl_dest`
    Level(LogLevel),
}

impl DestTarget {
    pub fn feature(name: impl Into<String>) -> Self {
        DestTarget::Feature(name.into())
    }
}

impl From<LogLevel> for DestTarget {
    fn from(level: LogLevel) -> Self {
        DestTarget::Level(level)
    }
}
