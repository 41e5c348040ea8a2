use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a level name does not match any supported level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid log level specified: {0}")]
pub struct ParseLevelError(pub String);

/// Severity of a log record.
///
/// The derive order gives the total order used for range filtering:
/// `Debug < Info < Warning < Error < Critical`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// All supported levels, in ascending severity.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Canonical upper-case name, as written to sinks and the wire.
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("info", LogLevel::Info)]
    #[case("Warning", LogLevel::Warning)]
    #[case("ERROR", LogLevel::Error)]
    #[case("critical", LogLevel::Critical)]
    fn parses_supported_names(#[case] input: &str, #[case] expected: LogLevel) {
        assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_name() {
        let err = "VERBOSE".parse::<LogLevel>().unwrap_err();
        assert_eq!(err, ParseLevelError("VERBOSE".into()));
        assert!(err.to_string().contains("VERBOSE"));
    }

    #[test]
    fn levels_are_totally_ordered() {
        let mut sorted = LogLevel::ALL;
        sorted.sort();
        assert_eq!(sorted, LogLevel::ALL);
        assert!(LogLevel::Debug < LogLevel::Critical);
        assert!(LogLevel::Warning > LogLevel::Info);
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
    }
}
