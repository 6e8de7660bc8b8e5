//! Service configuration
//!
//! Everything the binding layer can tune is an explicit field here and is
//! handed to [`LogService::start`](crate::core::LogService::start); there is
//! no process-wide state.

use super::error::{LoggerError, Result};
use super::message_pool::DEFAULT_POOL_BATCH;
use crate::destinations::RollingType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default maximum size of one log file before a forced rotation (16 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Default retention age of rotated files (7 days)
pub const DEFAULT_CLEAN_TIME_SECS: u64 = 7 * 24 * 3600;

/// Configuration for a [`LogService`](crate::core::LogService)
///
/// # Examples
///
/// ```
/// use log_service::prelude::*;
///
/// let config = ServiceConfig::new("/var/log/game", "lobby")
///     .with_index(3)
///     .with_rolling(RollingType::Daily)
///     .with_max_file_size(64 * 1024 * 1024)
///     .with_daemon(true);
///
/// assert_eq!(config.service_id(), "lobby-3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Root directory of all log files
    pub log_root: PathBuf,
    /// Service name, also the feature name of the main destination
    pub service: String,
    /// Instance index, appended to the service directory name
    pub index: u32,
    /// Rotation granularity of rolling destinations
    pub rolling: RollingType,
    /// Bytes per file before a forced rotation
    pub max_file_size: u64,
    /// Age in seconds after which rotated files are deleted
    pub clean_time_secs: u64,
    /// Suppress the console echo
    pub daemon: bool,
    /// Color console lines by level
    pub console_colors: bool,
    /// Records allocated per pool growth step
    pub pool_batch_size: usize,
    /// Dispatcher sleep between iterations, in milliseconds
    pub dispatch_period_ms: u64,
    /// Consecutive contended drains of one agent before a blocking drain
    /// is forced; 0 never forces
    pub max_skipped_drains: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_root: PathBuf::from("logs"),
            service: "service".to_string(),
            index: 1,
            rolling: RollingType::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            clean_time_secs: DEFAULT_CLEAN_TIME_SECS,
            daemon: false,
            console_colors: true,
            pool_batch_size: DEFAULT_POOL_BATCH,
            dispatch_period_ms: 1,
            max_skipped_drains: 8,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration with default tuning
    #[must_use]
    pub fn new(log_root: impl Into<PathBuf>, service: impl Into<String>) -> Self {
        Self {
            log_root: log_root.into(),
            service: service.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid JSON for this structure or the
    /// resulting configuration fails [`validate`](Self::validate)
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ServiceConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.service.is_empty() {
            return Err(LoggerError::config("ServiceConfig", "service name must not be empty"));
        }
        if self.max_file_size == 0 {
            return Err(LoggerError::config("ServiceConfig", "max_file_size must be positive"));
        }
        if self.pool_batch_size == 0 {
            return Err(LoggerError::config("ServiceConfig", "pool_batch_size must be positive"));
        }
        if self.dispatch_period_ms == 0 {
            return Err(LoggerError::config("ServiceConfig", "dispatch_period_ms must be positive"));
        }
        Ok(())
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rolling(mut self, rolling: RollingType) -> Self {
        self.rolling = rolling;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_clean_time(mut self, age: Duration) -> Self {
        self.clean_time_secs = age.as_secs();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_pool_batch_size(mut self, size: usize) -> Self {
        self.pool_batch_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_dispatch_period(mut self, period: Duration) -> Self {
        self.dispatch_period_ms = period.as_millis() as u64;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_skipped_drains(mut self, count: u32) -> Self {
        self.max_skipped_drains = count;
        self
    }

    /// `<service>-<index>`, the directory name of the main destination
    pub fn service_id(&self) -> String {
        format!("{}-{}", self.service, self.index)
    }

    pub fn clean_time(&self) -> Duration {
        Duration::from_secs(self.clean_time_secs)
    }

    pub fn dispatch_period(&self) -> Duration {
        Duration::from_millis(self.dispatch_period_ms)
    }

    /// Directory of a feature: the service directory when the feature is a
    /// prefix of the service id, otherwise `<root>/<feature>`
    pub fn feature_path(&self, feature: &str) -> PathBuf {
        let service_id = self.service_id();
        if service_id.starts_with(feature) {
            self.log_root.join(service_id)
        } else {
            self.log_root.join(feature)
        }
    }

    /// Directory of the service's own files
    pub fn service_path(&self) -> PathBuf {
        self.log_root.join(self.service_id())
    }

    pub fn log_root(&self) -> &Path {
        &self.log_root
    }
}
