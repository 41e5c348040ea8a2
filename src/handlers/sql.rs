//! SQLite sink.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};

use crate::handler::{Handler, HandlerError};
use crate::record::LogRecord;

use super::{DatedPath, record_hash};

const CREATE_LOGS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS logs (
        hash_message TEXT PRIMARY KEY,
        message TEXT,
        loglevel TEXT,
        asctime TEXT,
        iso_8601_time TEXT,
        loggername TEXT
    )";

/// Handler inserting records into a per-day SQLite database.
///
/// Rows are keyed by the record's stable hash, so replays of an identical
/// record replace rather than duplicate.
pub struct SqlHandler {
    path: DatedPath,
    conn: Connection,
}

impl SqlHandler {
    /// Open `logs/<name>_<date>.db`, creating the `logs` table.
    pub fn new(name: &str) -> Result<Self, HandlerError> {
        Self::with_dir(name, "logs")
    }

    /// Open `<dir>/<name>_<date>.db`, creating `dir` and the `logs` table.
    pub fn with_dir(name: &str, dir: impl Into<PathBuf>) -> Result<Self, HandlerError> {
        let path = DatedPath::new(dir, name, "db")?;
        let conn = Self::open_db(&path.current())?;
        Ok(Self { path, conn })
    }

    fn open_db(path: &Path) -> Result<Connection, HandlerError> {
        let conn = Connection::open(path)?;
        conn.execute(CREATE_LOGS_TABLE, [])?;
        Ok(conn)
    }
}

impl Handler for SqlHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        if self.path.roll_if_stale() {
            self.conn = Self::open_db(&self.path.current())?;
        }
        self.conn.execute(
            "INSERT OR REPLACE INTO logs \
             (hash_message, message, loglevel, asctime, iso_8601_time, loggername) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record_hash(record),
                record.message,
                record.level.name(),
                record.asctime,
                record.iso_8601_time,
                record.logger_name,
            ],
        )?;
        Ok(())
    }
}
