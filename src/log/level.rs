//! Message severities.

use std::fmt;

/// Severity of a log line. Lower values are more important.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Always emitted, regardless of the configured threshold.
    Msg = 0,
    Error = 1,
    Warn = 2,
    Info1 = 3,
    Info2 = 4,
    Debug = 5,
}

impl Level {
    /// Whether a line at this level passes `threshold`.
    pub fn passes(self, threshold: u8) -> bool {
        self == Level::Msg || threshold >= self as u8
    }

    /// Short name used in file output.
    pub fn name(self) -> &'static str {
        match self {
            Level::Msg => "msg",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info1 | Level::Info2 => "info",
            Level::Debug => "debug",
        }
    }
}

impl From<u8> for Level {
    fn from(val: u8) -> Self {
        match val {
            0 => Level::Msg,
            1 => Level::Error,
            2 => Level::Warn,
            3 => Level::Info1,
            4 => Level::Info2,
            _ => Level::Debug,
        }
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info1,
            tracing::Level::DEBUG => Level::Info2,
            _ => Level::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
