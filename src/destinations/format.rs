//! Line layout shared by every destination
//!
//! `[YYYY-MM-DD HH:MM:SS.mmm][tag][LEVEL] message[source:line]`

use crate::core::LogMessage;
use std::fmt::Write;

/// Per-destination line builder
///
/// Holds the reusable line buffer and the rendered seconds of the last
/// record, which only changes once per second under load.
#[derive(Debug, Default)]
pub struct LineFormat {
    ignore_prefix: bool,
    ignore_suffix: bool,
    cached_second: Option<i64>,
    seconds: String,
    line: String,
}

impl LineFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the prefix suppressed
    #[must_use]
    pub fn without_prefix(mut self) -> Self {
        self.ignore_prefix = true;
        self
    }

    pub fn ignore_prefix(&mut self, ignore: bool) {
        self.ignore_prefix = ignore;
    }

    pub fn ignore_suffix(&mut self, ignore: bool) {
        self.ignore_suffix = ignore;
    }

    pub fn is_ignore_prefix(&self) -> bool {
        self.ignore_prefix
    }

    pub fn is_ignore_suffix(&self) -> bool {
        self.ignore_suffix
    }

    /// Render `msg` into the internal buffer, without a trailing newline
    pub fn format(&mut self, msg: &LogMessage) -> &str {
        self.line.clear();
        if !self.ignore_prefix {
            let second = msg.time().second_key();
            if self.cached_second != Some(second) {
                self.seconds.clear();
                self.seconds.push_str(&msg.time().format_seconds());
                self.cached_second = Some(second);
            }
            let _ = write!(
                self.line,
                "[{}.{:03}][{}][{}] ",
                self.seconds,
                msg.time().millis(),
                msg.tag(),
                msg.level()
            );
        }
        self.line.push_str(msg.msg());
        if !self.ignore_suffix {
            let _ = write!(self.line, "[{}:{}]", msg.source(), msg.line());
        }
        &self.line
    }

    /// Render `msg` followed by a newline, as stored in files
    pub fn format_line(&mut self, msg: &LogMessage) -> &[u8] {
        self.format(msg);
        self.line.push('\n');
        self.line.as_bytes()
    }

    /// The last rendered line
    pub fn as_bytes(&self) -> &[u8] {
        self.line.as_bytes()
    }
}
