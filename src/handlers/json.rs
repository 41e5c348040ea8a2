//! JSON file sink.

use std::fs::File;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::handler::{Handler, HandlerError};
use crate::record::LogRecord;

use super::{DatedPath, record_hash};

/// Handler maintaining a JSON object keyed by record hash.
///
/// Each emit inserts the record's field map under its SHA-256 hash and
/// rewrites the whole day file pretty-printed, so the file is always a
/// single valid JSON document. Rollover starts an empty object.
pub struct JsonHandler {
    path: DatedPath,
    entries: Map<String, Value>,
}

impl JsonHandler {
    /// Target `logs/<name>_<date>.json`.
    pub fn new(name: &str) -> Result<Self, HandlerError> {
        Self::with_dir(name, "logs")
    }

    /// Target `<dir>/<name>_<date>.json`, creating `dir`.
    pub fn with_dir(name: &str, dir: impl Into<PathBuf>) -> Result<Self, HandlerError> {
        let path = DatedPath::new(dir, name, "json")?;
        let handler = Self {
            path,
            entries: Map::new(),
        };
        handler.write_entries()?;
        Ok(handler)
    }

    fn write_entries(&self) -> Result<(), HandlerError> {
        let file = File::create(self.path.current())?;
        serde_json::to_writer_pretty(file, &self.entries)?;
        Ok(())
    }
}

impl Handler for JsonHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        if self.path.roll_if_stale() {
            self.entries.clear();
        }
        let mut fields = Map::new();
        for (key, value) in record.values() {
            fields.insert(key.to_owned(), Value::String(value.to_owned()));
        }
        self.entries.insert(record_hash(record), Value::Object(fields));
        self.write_entries()
    }
}
