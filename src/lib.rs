//! # Log Service
//!
//! An embeddable asynchronous logging engine. Producers queue records into
//! their own pooled, double-buffered queues without touching I/O; one
//! background dispatcher drains every producer and fans each record out to
//! the console, the service's main rolling file, and optional per-level and
//! per-feature files.
//!
//! ## Features
//!
//! - **Pooled records**: steady-state logging reuses record buffers
//! - **Per-producer queues**: a spin-locked pointer swap is the only contention
//! - **Memory-mapped rolling files**: hourly or daily rotation, size cap,
//!   age-based cleanup
//! - **Level filter**: one bit per level, checked before any allocation
//!
//! ## Example
//!
//! ```no_run
//! use log_service::prelude::*;
//! use log_service::{info, warn};
//!
//! let service = LogService::start(
//!     ServiceConfig::new("/var/log/game", "world").with_rolling(RollingType::Daily),
//! )
//! .unwrap();
//! service.add_lvl_dest(LogLevel::Error);
//!
//! let producer = service.register_producer();
//! info!(producer, "world {} online", 3);
//! warn!(producer, "tick took {}ms", 120);
//!
//! service.stop();
//! ```

pub mod core;
pub mod destinations;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        LogLevel, LogService, LoggerError, LoggerMetrics, ProducerHandle, Result, ServiceConfig,
    };
    pub use crate::destinations::{DestTarget, RollingType};
}

pub use core::{
    LogFilter, LogLevel, LogMessage, LogService, LogTime, LoggerError, LoggerMetrics,
    ProducerHandle, Result, ServiceConfig,
};
pub use destinations::{DestTarget, RollingType};
