//! Core engine: records, pools, queues, producers and the service

pub mod agent;
pub mod config;
mod dispatcher;
pub mod error;
pub mod log_level;
pub mod log_message;
pub mod log_time;
pub mod message_pool;
pub mod message_queue;
pub mod metrics;
pub mod service;
pub mod spin_lock;

pub use agent::{LogAgent, ProducerHandle};
pub use config::{ServiceConfig, DEFAULT_CLEAN_TIME_SECS, DEFAULT_MAX_FILE_SIZE};
pub use error::{LoggerError, Result};
pub use log_level::{LogFilter, LogLevel, LEVEL_NAMES};
pub use log_message::LogMessage;
pub use log_time::LogTime;
pub use message_pool::{MessagePool, DEFAULT_POOL_BATCH};
pub use message_queue::{Drained, MessageQueue};
pub use metrics::LoggerMetrics;
pub use service::LogService;
pub use spin_lock::{RawSpinLock, SpinLock, SpinLockGuard};
