//! Local sink implementations.
//!
//! Every file-based sink shares the `<dir>/<name>_<YYYY-MM-DD>.<ext>`
//! naming convention and rolls to a new file when the UTC date changes,
//! checked on each emit.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};

use crate::record::LogRecord;

pub mod console;
pub mod csv;
pub mod file;
pub mod json;
pub mod sql;

pub use console::ConsoleHandler;
pub use csv::CsvHandler;
pub use file::FileHandler;
pub use json::JsonHandler;
pub use sql::SqlHandler;

/// Date-stamped sink path with rollover tracking.
#[derive(Debug, Clone)]
pub(crate) struct DatedPath {
    dir: PathBuf,
    name: String,
    ext: &'static str,
    current_date: NaiveDate,
}

impl DatedPath {
    /// Create the sink directory and fix today's date.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>, ext: &'static str) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            name: name.into(),
            ext,
            current_date: Utc::now().date_naive(),
        })
    }

    /// Path of the file for the tracked date.
    pub fn current(&self) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.{}",
            self.name,
            self.current_date.format("%Y-%m-%d"),
            self.ext
        ))
    }

    /// Advance to today's date; true when the date changed and the sink
    /// must reopen its file.
    pub fn roll_if_stale(&mut self) -> bool {
        let today = Utc::now().date_naive();
        if today == self.current_date {
            return false;
        }
        self.current_date = today;
        true
    }
}

/// Open a file for appending, creating it if absent.
pub(crate) fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Stable hex-encoded SHA-256 over a record's field values.
///
/// Keys the JSON object entries and the SQL primary column, so identical
/// records coalesce across runs.
pub(crate) fn record_hash(record: &LogRecord) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in record.values() {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;

    #[test]
    fn dated_path_uses_naming_convention() {
        let tmp = tempfile::tempdir().unwrap();
        let path = DatedPath::new(tmp.path(), "app", "log").unwrap();
        let file_name = path.current().file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("app_"));
        assert!(file_name.ends_with(".log"));
        // app_YYYY-MM-DD.log
        assert_eq!(file_name.len(), "app_0000-00-00.log".len());
    }

    #[test]
    fn record_hash_is_stable_and_distinguishes_records() {
        let a = LogRecord::new("app", "i", "a", LogLevel::Info, "one");
        let b = LogRecord::new("app", "i", "a", LogLevel::Info, "two");
        assert_eq!(record_hash(&a), record_hash(&a));
        assert_ne!(record_hash(&a), record_hash(&b));
        assert_eq!(record_hash(&a).len(), 64);
    }
}
