//! Plain-text file sink.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::formatter::{Formatter, TemplateFormatter};
use crate::handler::{Handler, HandlerError};
use crate::record::LogRecord;

use super::{DatedPath, open_append};

/// Handler appending rendered lines to a date-stamped `.log` file.
pub struct FileHandler {
    path: DatedPath,
    file: File,
    formatter: TemplateFormatter,
}

impl FileHandler {
    /// Open `logs/<name>_<date>.log` for appending.
    pub fn new(name: &str) -> io::Result<Self> {
        Self::with_dir(name, "logs")
    }

    /// Open `<dir>/<name>_<date>.log` for appending, creating `dir`.
    pub fn with_dir(name: &str, dir: impl Into<PathBuf>) -> io::Result<Self> {
        let path = DatedPath::new(dir, name, "log")?;
        let file = open_append(&path.current())?;
        Ok(Self {
            path,
            file,
            formatter: TemplateFormatter::default(),
        })
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.formatter = TemplateFormatter::new(template);
        self
    }
}

impl Handler for FileHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        if self.path.roll_if_stale() {
            self.file = open_append(&self.path.current())?;
        }
        writeln!(self.file, "{}", self.formatter.format(record))?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;

    #[test]
    fn appends_one_line_per_record() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handler = FileHandler::with_dir("app", tmp.path()).unwrap();

        handler
            .emit(&LogRecord::new("app", "i1", "a1", LogLevel::Info, "first"))
            .unwrap();
        handler
            .emit(&LogRecord::new("app", "i2", "a2", LogLevel::Error, "second"))
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let contents = std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a1: [app]: [INFO]: first");
        assert_eq!(lines[1], "a2: [app]: [ERROR]: second");
    }

    #[test]
    fn creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("deep").join("logs");
        let handler = FileHandler::with_dir("app", &nested);
        assert!(handler.is_ok());
        assert!(nested.is_dir());
    }
}
