//! Log record structure
//!
//! A [`LogMessage`] is filled once per emission by [`LogMessage::option`] and
//! is not touched again until its pool hands it out for the next emission.
//! The string buffers keep their capacity across reuse, so steady-state
//! logging does not allocate.

use super::log_level::LogLevel;
use super::log_time::LogTime;
use std::fmt::{self, Write};

#[derive(Debug, Clone, Default)]
pub struct LogMessage {
    level: LogLevel,
    time: LogTime,
    tag: String,
    feature: String,
    source: String,
    line: u32,
    msg: String,
    overflow: bool,
}

impl LogMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A one-off record allocated outside the pool; it is never recycled
    pub(crate) fn overflow() -> Self {
        Self {
            overflow: true,
            ..Self::default()
        }
    }

    /// Populate every field, capturing the current time
    pub fn option(
        &mut self,
        level: LogLevel,
        msg: &str,
        tag: &str,
        feature: &str,
        source: &str,
        line: u32,
    ) {
        self.option_at(LogTime::now(), level, msg, tag, feature, source, line);
    }

    /// Populate every field with an explicit timestamp
    #[allow(clippy::too_many_arguments)]
    pub fn option_at(
        &mut self,
        time: LogTime,
        level: LogLevel,
        msg: &str,
        tag: &str,
        feature: &str,
        source: &str,
        line: u32,
    ) {
        self.fill_header(time, level, tag, feature, source, line);
        self.msg.clear();
        self.msg.push_str(msg);
    }

    /// Populate every field, formatting the message straight into the
    /// recycled buffer
    pub fn option_fmt(
        &mut self,
        level: LogLevel,
        args: fmt::Arguments<'_>,
        tag: &str,
        feature: &str,
        source: &str,
        line: u32,
    ) {
        self.fill_header(LogTime::now(), level, tag, feature, source, line);
        self.msg.clear();
        // Writing into a String only fails if a Display impl reports an error
        let _ = self.msg.write_fmt(args);
    }

    fn fill_header(
        &mut self,
        time: LogTime,
        level: LogLevel,
        tag: &str,
        feature: &str,
        source: &str,
        line: u32,
    ) {
        self.time = time;
        self.level = level;
        self.line = line;
        replace(&mut self.tag, tag);
        replace(&mut self.feature, feature);
        replace(&mut self.source, source);
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn time(&self) -> &LogTime {
        &self.time
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Allocated outside the pool under exhaustion
    #[inline]
    pub fn is_overflow(&self) -> bool {
        self.overflow
    }
}

fn replace(dst: &mut String, src: &str) {
    dst.clear();
    dst.push_str(src);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_sets_all_fields() {
        let time = LogTime::from_ymd_hms_milli(2024, 5, 6, 7, 8, 9, 10).unwrap();
        let mut msg = LogMessage::new();
        msg.option_at(time, LogLevel::Error, "disk full", "io", "storage", "src/io.rs", 42);

        assert_eq!(msg.level(), LogLevel::Error);
        assert_eq!(msg.time(), &time);
        assert_eq!(msg.msg(), "disk full");
        assert_eq!(msg.tag(), "io");
        assert_eq!(msg.feature(), "storage");
        assert_eq!(msg.source(), "src/io.rs");
        assert_eq!(msg.line(), 42);
        assert!(!msg.is_overflow());
    }

    #[test]
    fn test_reuse_overwrites_previous_content() {
        let mut msg = LogMessage::new();
        msg.option(LogLevel::Warn, "a much longer first message", "first-tag", "alpha", "a.rs", 1);
        msg.option(LogLevel::Info, "short", "", "", "b.rs", 2);

        assert_eq!(msg.level(), LogLevel::Info);
        assert_eq!(msg.msg(), "short");
        assert_eq!(msg.tag(), "");
        assert_eq!(msg.feature(), "");
        assert_eq!(msg.source(), "b.rs");
        assert_eq!(msg.line(), 2);
    }

    #[test]
    fn test_option_fmt() {
        let mut msg = LogMessage::new();
        msg.option_fmt(LogLevel::Debug, format_args!("user {} did {}", 42, "login"), "", "", "", 0);
        assert_eq!(msg.msg(), "user 42 did login");
    }

    #[test]
    fn test_overflow_flag() {
        let mut msg = LogMessage::overflow();
        msg.option(LogLevel::Info, "x", "", "", "", 0);
        assert!(msg.is_overflow());
    }
}
