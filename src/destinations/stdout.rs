//! Console destination

use super::format::LineFormat;
use crate::core::{LogLevel, LogMessage, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

pub struct StdoutDest {
    use_colors: bool,
    format: LineFormat,
}

impl StdoutDest {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            format: LineFormat::new(),
        }
    }

    pub fn write(&mut self, msg: &LogMessage) -> Result<()> {
        let line = self.format.format(msg);
        let mut out = std::io::stdout().lock();
        if self.use_colors {
            write_colored(&mut out, line, msg.level())?;
        } else {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }

    pub fn format_mut(&mut self) -> &mut LineFormat {
        &mut self.format
    }

    pub fn use_colors(&self) -> bool {
        self.use_colors
    }
}

#[cfg(feature = "console")]
fn write_colored(out: &mut impl Write, line: &str, level: LogLevel) -> std::io::Result<()> {
    writeln!(out, "{}", line.color(level.color_code()))
}

#[cfg(not(feature = "console"))]
fn write_colored(out: &mut impl Write, line: &str, _level: LogLevel) -> std::io::Result<()> {
    writeln!(out, "{}", line)
}

impl Default for StdoutDest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_plain_and_colored() {
        let mut msg = LogMessage::new();
        msg.option(LogLevel::Error, "console check", "", "", "s.rs", 3);

        let mut plain = StdoutDest::with_colors(false);
        assert!(plain.write(&msg).is_ok());
        assert!(plain.flush().is_ok());

        let mut colored = StdoutDest::new();
        assert!(colored.use_colors());
        assert!(colored.write(&msg).is_ok());
    }
}
