//! Rolling file destination with time-based rotation and age-based cleanup
//!
//! A new file is opened when no file is open yet, when the incoming record's
//! timestamp leaves the hour or day the current file was opened in, or when
//! the line would push the file past its maximum size. Every rotation first
//! sweeps the directory for expired files.

use super::format::LineFormat;
use super::mapped_file::MappedFile;
use crate::core::error::{LoggerError, Result};
use crate::core::{LogMessage, LogTime, LoggerMetrics};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Attempts at a unique file name before a rotation gives up
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Rotation granularity
///
/// # Examples
///
/// ```
/// use log_service::core::LogTime;
/// use log_service::destinations::RollingType;
///
/// let opened = LogTime::from_ymd_hms_milli(2024, 1, 1, 23, 59, 59, 0).unwrap();
/// let earlier = LogTime::from_ymd_hms_milli(2024, 1, 1, 22, 30, 0, 0).unwrap();
/// let next_day = LogTime::from_ymd_hms_milli(2024, 1, 2, 0, 0, 1, 0).unwrap();
///
/// assert!(RollingType::Hourly.should_roll(&opened, &earlier));
/// assert!(!RollingType::Daily.should_roll(&opened, &earlier));
/// assert!(RollingType::Daily.should_roll(&opened, &next_day));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RollingType {
    /// New file whenever the hour differs
    #[default]
    Hourly,
    /// New file whenever the day differs
    Daily,
}

impl RollingType {
    /// Whether a record stamped `record_time` belongs in a new file, given
    /// the file's open time
    pub fn should_roll(&self, file_time: &LogTime, record_time: &LogTime) -> bool {
        match self {
            RollingType::Hourly => !file_time.same_hour(record_time),
            RollingType::Daily => !file_time.same_day(record_time),
        }
    }
}

impl fmt::Display for RollingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollingType::Hourly => write!(f, "hourly"),
            RollingType::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for RollingType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hourly" => Ok(RollingType::Hourly),
            "daily" => Ok(RollingType::Daily),
            _ => Err(format!("Invalid rolling type: '{}'", s)),
        }
    }
}

/// Rolling file destination
///
/// # Examples
///
/// ```no_run
/// use log_service::destinations::{RollingFileDest, RollingType};
/// use std::time::Duration;
///
/// let dest = RollingFileDest::new(
///     "/var/log/game/lobby-1",
///     "lobby",
///     RollingType::Daily,
///     16 * 1024 * 1024,
///     Duration::from_secs(7 * 24 * 3600),
/// )
/// .unwrap();
/// ```
pub struct RollingFileDest {
    dir: PathBuf,
    feature: String,
    rolling: RollingType,
    max_file_size: u64,
    clean_time: Duration,
    format: LineFormat,
    file: Option<MappedFile>,
    file_time: LogTime,
    metrics: Option<Arc<LoggerMetrics>>,
}

impl RollingFileDest {
    /// Create the destination and its directory; the first file is opened
    /// by the first write
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(
        dir: impl Into<PathBuf>,
        feature: impl Into<String>,
        rolling: RollingType,
        max_file_size: u64,
        clean_time: Duration,
    ) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", dir.display()),
                e,
            )
        })?;
        Ok(Self {
            dir,
            feature: feature.into(),
            rolling,
            max_file_size,
            clean_time,
            format: LineFormat::new(),
            file: None,
            file_time: LogTime::default(),
            metrics: None,
        })
    }

    /// Count rotations into `metrics`
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<LoggerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn write(&mut self, msg: &LogMessage) -> Result<()> {
        let msize = self.format.format_line(msg).len() as u64;
        if self.should_rotate(msg.time(), msize) {
            self.rotate(msg.time())?;
        }
        let file = self.file.as_mut().ok_or_else(|| {
            LoggerError::file_rotation(self.dir.display().to_string(), "no open file")
        })?;
        if let Err(e) = file.append(self.format.as_bytes()) {
            // reopen on the next write
            self.file = None;
            return Err(e);
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        match &self.file {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    fn should_rotate(&self, time: &LogTime, msize: u64) -> bool {
        match &self.file {
            None => true,
            Some(file) => {
                self.rolling.should_roll(&self.file_time, time)
                    || (file.used() > 0 && file.used() + msize > self.max_file_size)
            }
        }
    }

    fn rotate(&mut self, time: &LogTime) -> Result<()> {
        self.file = None;
        fs::create_dir_all(&self.dir)?;
        cleanup_expired(&self.dir, self.clean_time);

        let base = format!(
            "{}-{}.{:03}.p{}",
            self.feature,
            time.file_stamp(),
            time.millis(),
            std::process::id()
        );
        self.file = Some(create_unique(&self.dir, &base)?);
        self.file_time = *time;
        if let Some(metrics) = &self.metrics {
            metrics.record_rotation();
        }
        Ok(())
    }

    pub fn format_mut(&mut self) -> &mut LineFormat {
        &mut self.format
    }

    pub fn set_clean_time(&mut self, clean_time: Duration) {
        self.clean_time = clean_time;
    }

    pub fn clean_time(&self) -> Duration {
        self.clean_time
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Path of the file currently written, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }
}

/// Open `<base>.log`, or `<base>_<n>.log` when earlier names are taken
fn create_unique(dir: &Path, base: &str) -> Result<MappedFile> {
    for n in 0..MAX_NAME_ATTEMPTS {
        let name = if n == 0 {
            format!("{}.log", base)
        } else {
            format!("{}_{}.log", base, n)
        };
        match MappedFile::create_new(dir.join(&name)) {
            Ok(file) => return Ok(file),
            Err(LoggerError::IoError(e)) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(LoggerError::file_rotation(
        dir.join(base).display().to_string(),
        "no unused file name",
    ))
}

/// Delete this engine's `.log` files under `dir` whose last write is older
/// than `clean_time`. Best effort: every failure is ignored.
pub fn cleanup_expired(dir: &Path, clean_time: Duration) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let now = SystemTime::now();
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            cleanup_expired(&path, clean_time);
            continue;
        }
        if !is_rotated_log(&path) {
            continue;
        }
        let expired = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > clean_time);
        if expired {
            let _ = fs::remove_file(&path);
        }
    }
}

/// `name.<something>.log`: a `.log` file whose stem carries its own extension
fn is_rotated_log(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "log")
        && path
            .file_stem()
            .is_some_and(|stem| Path::new(stem).extension().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::tempdir;

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> LogTime {
        LogTime::from_ymd_hms_milli(2024, 1, day, hour, minute, second, 0).unwrap()
    }

    fn record(time: LogTime, text: &str) -> LogMessage {
        let mut msg = LogMessage::new();
        msg.option_at(time, LogLevel::Info, text, "", "", "t.rs", 1);
        msg
    }

    fn log_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "log"))
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_rolling_boundaries() {
        let opened = at(1, 23, 59, 59);
        assert!(RollingType::Daily.should_roll(&opened, &at(2, 0, 0, 1)));
        assert!(RollingType::Hourly.should_roll(&opened, &at(2, 0, 0, 1)));
        assert!(RollingType::Hourly.should_roll(&opened, &at(1, 22, 30, 0)));
        assert!(!RollingType::Daily.should_roll(&opened, &at(1, 23, 30, 0)));
        assert!(!RollingType::Hourly.should_roll(&opened, &at(1, 23, 0, 0)));
    }

    #[test]
    fn test_same_hour_next_month_rolls() {
        let opened = LogTime::from_ymd_hms_milli(2024, 1, 5, 10, 0, 0, 0).unwrap();
        let next = LogTime::from_ymd_hms_milli(2024, 2, 5, 10, 0, 0, 0).unwrap();
        assert!(RollingType::Hourly.should_roll(&opened, &next));
        assert!(RollingType::Daily.should_roll(&opened, &next));
    }

    #[test]
    fn test_rolling_type_parse() {
        assert_eq!("Daily".parse::<RollingType>().unwrap(), RollingType::Daily);
        assert_eq!("hourly".parse::<RollingType>().unwrap(), RollingType::Hourly);
        assert!("weekly".parse::<RollingType>().is_err());
    }

    #[test]
    fn test_rotates_on_hour_change() {
        let dir = tempdir().unwrap();
        let mut dest = RollingFileDest::new(
            dir.path(),
            "game",
            RollingType::Hourly,
            1 << 20,
            Duration::from_secs(3600),
        )
        .unwrap();

        dest.write(&record(at(1, 10, 0, 0), "first")).unwrap();
        dest.write(&record(at(1, 10, 59, 59), "second")).unwrap();
        dest.write(&record(at(1, 11, 0, 0), "third")).unwrap();
        drop(dest);

        let files = log_files(dir.path());
        assert_eq!(files.len(), 2);
        let first = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(first.lines().count(), 2);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("game-20240101-100000.000.p"), "{}", name);
        assert!(fs::read_to_string(&files[1]).unwrap().contains("third"));
    }

    #[test]
    fn test_rotates_on_size() {
        let dir = tempdir().unwrap();
        let mut dest =
            RollingFileDest::new(dir.path(), "big", RollingType::Daily, 64, Duration::from_secs(3600))
                .unwrap();
        for i in 0..4 {
            dest.write(&record(at(1, 10, 0, i), &"y".repeat(30))).unwrap();
        }
        drop(dest);

        for file in log_files(dir.path()) {
            assert_eq!(fs::read_to_string(&file).unwrap().lines().count(), 1);
        }
    }

    #[test]
    fn test_same_millisecond_rotation_keeps_both_files() {
        let dir = tempdir().unwrap();
        let mut dest =
            RollingFileDest::new(dir.path(), "dup", RollingType::Daily, 8, Duration::from_secs(3600))
                .unwrap();
        let time = at(1, 10, 0, 0);
        dest.write(&record(time, "one")).unwrap();
        dest.write(&record(time, "two")).unwrap();
        drop(dest);

        let files = log_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files
            .iter()
            .any(|f| f.to_string_lossy().ends_with(&format!("p{}_1.log", std::process::id()))));
    }

    #[test]
    fn test_cleanup_only_touches_rotated_logs() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("error");
        fs::create_dir_all(&nested).unwrap();
        let rotated = nested.join("error-20240101-000000.000.p1.log");
        let plain = dir.path().join("plain.log");
        let other = dir.path().join("notes.20240101.txt");
        for path in [&rotated, &plain, &other] {
            fs::write(path, b"x").unwrap();
        }

        std::thread::sleep(Duration::from_millis(50));
        cleanup_expired(dir.path(), Duration::ZERO);

        assert!(!rotated.exists());
        assert!(plain.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_cleanup_keeps_fresh_files() {
        let dir = tempdir().unwrap();
        let fresh = dir.path().join("svc-20240101-000000.000.p1.log");
        fs::write(&fresh, b"x").unwrap();
        cleanup_expired(dir.path(), Duration::from_secs(3600));
        assert!(fresh.exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_silent() {
        cleanup_expired(Path::new("/definitely/not/here"), Duration::ZERO);
    }
}
