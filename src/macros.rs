//! Logging macros with `format!` syntax and captured source location
//!
//! Each macro takes a [`ProducerHandle`](crate::ProducerHandle) first and
//! records `file!()` and `line!()` of the call site. The message is formatted
//! straight into the pooled record, and not at all when the level is
//! filtered out.
//!
//! # Examples
//!
//! ```no_run
//! use log_service::prelude::*;
//! use log_service::{info, log};
//!
//! let service = LogService::start(ServiceConfig::new("/tmp/logs", "demo")).unwrap();
//! let producer = service.register_producer();
//!
//! info!(producer, "Server listening on port {}", 8080);
//!
//! // With a tag and a feature destination
//! log!(producer, LogLevel::Dump, tag: "net", feature: "packets"; "{:02x?}", [1u8, 2, 3]);
//! ```

/// Log at an explicit level, optionally with a tag and feature.
///
/// # Examples
///
/// ```no_run
/// # use log_service::prelude::*;
/// # let service = LogService::start(ServiceConfig::new("/tmp/logs", "demo")).unwrap();
/// # let producer = service.register_producer();
/// use log_service::log;
/// log!(producer, LogLevel::Info, "Simple message");
/// log!(producer, LogLevel::Error, tag: "db"; "Error code: {}", 500);
/// log!(producer, LogLevel::Info, feature: "chat"; "{} joined", "alice");
/// ```
#[macro_export]
macro_rules! log {
    ($producer:expr, $level:expr, tag: $tag:expr, feature: $feature:expr; $($arg:tt)+) => {
        $producer.output_fmt($level, format_args!($($arg)+), $tag, $feature, file!(), line!())
    };
    ($producer:expr, $level:expr, tag: $tag:expr; $($arg:tt)+) => {
        $crate::log!($producer, $level, tag: $tag, feature: ""; $($arg)+)
    };
    ($producer:expr, $level:expr, feature: $feature:expr; $($arg:tt)+) => {
        $crate::log!($producer, $level, tag: "", feature: $feature; $($arg)+)
    };
    ($producer:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($producer, $level, tag: "", feature: ""; $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```no_run
/// # use log_service::prelude::*;
/// # let service = LogService::start(ServiceConfig::new("/tmp/logs", "demo")).unwrap();
/// # let producer = service.register_producer();
/// use log_service::debug;
/// debug!(producer, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($producer:expr, $($arg:tt)+) => {
        $crate::log!($producer, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($producer:expr, $($arg:tt)+) => {
        $crate::log!($producer, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($producer:expr, $($arg:tt)+) => {
        $crate::log!($producer, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log a dump-level message, for bulk state snapshots.
///
/// # Examples
///
/// ```no_run
/// # use log_service::prelude::*;
/// # let service = LogService::start(ServiceConfig::new("/tmp/logs", "demo")).unwrap();
/// # let producer = service.register_producer();
/// use log_service::dump;
/// dump!(producer, feature: "state"; "players={:?}", vec![1, 2, 3]);
/// ```
#[macro_export]
macro_rules! dump {
    ($producer:expr, $($arg:tt)+) => {
        $crate::log!($producer, $crate::LogLevel::Dump, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($producer:expr, $($arg:tt)+) => {
        $crate::log!($producer, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($producer:expr, $($arg:tt)+) => {
        $crate::log!($producer, $crate::LogLevel::Fatal, $($arg)+)
    };
}
