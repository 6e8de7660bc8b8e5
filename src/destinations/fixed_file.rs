//! Mapped file with a fixed name
//!
//! Grows like a rolling file but never rotates and never cleans up. The file
//! is started empty; after a mapping failure the next write reopens it in
//! append mode.

use super::format::LineFormat;
use super::mapped_file::MappedFile;
use crate::core::error::{LoggerError, Result};
use crate::core::LogMessage;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FixedFileDest {
    path: PathBuf,
    feature: String,
    format: LineFormat,
    file: Option<MappedFile>,
}

impl FixedFileDest {
    /// Create (or empty) the file at `path`; the prefix is suppressed
    ///
    /// # Errors
    ///
    /// Returns error if the directory or the file cannot be created or mapped
    pub fn new(path: impl Into<PathBuf>, feature: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
        let file = MappedFile::create(&path)?;
        Ok(Self {
            path,
            feature: feature.into(),
            format: LineFormat::new().without_prefix(),
            file: Some(file),
        })
    }

    pub fn write(&mut self, msg: &LogMessage) -> Result<()> {
        self.format.format_line(msg);
        if self.file.is_none() {
            self.file = Some(MappedFile::open_append(&self.path)?);
        }
        let Some(file) = self.file.as_mut() else {
            return Err(LoggerError::mapping(self.path.display().to_string(), "no mapping"));
        };
        if let Err(e) = file.append(self.format.as_bytes()) {
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

    pub fn format_mut(&mut self) -> &mut LineFormat {
        &mut self.format
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_writes_without_prefix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("svc-1").join("stats.txt");
        {
            let mut dest = FixedFileDest::new(&path, "stats").unwrap();
            let mut msg = LogMessage::new();
            msg.option(LogLevel::Info, "online=42", "tag", "stats", "s.rs", 9);
            dest.write(&msg).unwrap();
            dest.format_mut().ignore_suffix(true);
            msg.option(LogLevel::Info, "online=43", "tag", "stats", "s.rs", 10);
            dest.write(&msg).unwrap();
            dest.flush().unwrap();
        }
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "online=42[s.rs:9]\nonline=43\n"
        );
    }
}
