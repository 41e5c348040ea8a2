//! Log record representation.
//!
//! A [`LogRecord`] captures one log event together with the two timestamp
//! renderings computed by the logger at call time. Records are built once
//! and never mutated; handlers receive them by shared reference.

use std::fmt;

use crate::level::LogLevel;

/// One structured log event.
///
/// Both timestamp fields are rendered from a single wall-clock read when
/// the logger accepts the call, so they always describe the same instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Name of the logger that created this record.
    pub logger_name: String,
    /// Strict ISO-8601 UTC timestamp.
    pub iso_8601_time: String,
    /// Timestamp in the logger's configured display format.
    pub asctime: String,
    /// Severity of the event.
    pub level: LogLevel,
    /// The log message content.
    pub message: String,
}

impl LogRecord {
    pub fn new(
        logger_name: impl Into<String>,
        iso_8601_time: impl Into<String>,
        asctime: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            logger_name: logger_name.into(),
            iso_8601_time: iso_8601_time.into(),
            asctime: asctime.into(),
            level,
            message: message.into(),
        }
    }

    /// Field pairs under their wire names, in wire order.
    ///
    /// This is the substitution set for template rendering and the column
    /// order used by the CSV and SQL sinks.
    pub fn values(&self) -> [(&'static str, &str); 5] {
        [
            ("loggername", self.logger_name.as_str()),
            ("iso_8601_time", self.iso_8601_time.as_str()),
            ("asctime", self.asctime.as_str()),
            ("loglevel", self.level.name()),
            ("message", self.message.as_str()),
        ]
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
