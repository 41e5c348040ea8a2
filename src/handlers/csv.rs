//! CSV file sink.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use ::csv::{Writer, WriterBuilder};

use crate::handler::{Handler, HandlerError};
use crate::record::LogRecord;

use super::{DatedPath, open_append};

/// Handler appending one semicolon-delimited row per record.
///
/// Rows carry no header and follow the wire field order:
/// `loggername;iso_8601_time;asctime;loglevel;message`.
pub struct CsvHandler {
    path: DatedPath,
    writer: Writer<File>,
}

impl CsvHandler {
    /// Open `logs/<name>_<date>.csv` for appending.
    pub fn new(name: &str) -> io::Result<Self> {
        Self::with_dir(name, "logs")
    }

    /// Open `<dir>/<name>_<date>.csv` for appending, creating `dir`.
    pub fn with_dir(name: &str, dir: impl Into<PathBuf>) -> io::Result<Self> {
        let path = DatedPath::new(dir, name, "csv")?;
        let writer = Self::open_writer(&path.current())?;
        Ok(Self { path, writer })
    }

    fn open_writer(path: &Path) -> io::Result<Writer<File>> {
        let file = open_append(path)?;
        Ok(WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_writer(file))
    }
}

impl Handler for CsvHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        if self.path.roll_if_stale() {
            self.writer = Self::open_writer(&self.path.current())?;
        }
        self.writer
            .write_record(record.values().iter().map(|(_, value)| *value))?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;

    #[test]
    fn writes_headerless_semicolon_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let mut handler = CsvHandler::with_dir("app", tmp.path()).unwrap();

        handler
            .emit(&LogRecord::new("app", "iso1", "asc1", LogLevel::Warning, "w"))
            .unwrap();
        handler
            .emit(&LogRecord::new("app", "iso2", "asc2", LogLevel::Info, "i"))
            .unwrap();

        let entry = std::fs::read_dir(tmp.path()).unwrap().next().unwrap().unwrap();
        assert!(entry.file_name().to_string_lossy().ends_with(".csv"));
        let contents = std::fs::read_to_string(entry.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "app;iso1;asc1;WARNING;w");
        assert_eq!(lines[1], "app;iso2;asc2;INFO;i");
    }
}
