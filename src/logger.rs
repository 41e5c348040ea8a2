//! The record dispatcher.
//!
//! A [`Logger`] filters calls by level, stamps accepted records with both
//! timestamp renderings from a single clock read, and fans each record out
//! synchronously to its handlers in insertion order.

use chrono::Utc;
use thiserror::Error;

use crate::handler::{Handler, HandlerError};
use crate::level::LogLevel;
use crate::record::LogRecord;

/// Strict ISO-8601 UTC rendering, microsecond precision with offset.
const ISO_8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%z";

/// Error returned by [`Logger::remove_handler`] for an unknown id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("handler not found in logger's handler list")]
pub struct HandlerNotFound;

/// Identity token for a registered handler.
///
/// Registration hands one out; removal takes it back. Tokens are unique
/// per logger for its lifetime, so the same handler instance added twice
/// yields two ids (and double delivery, which is the caller's
/// responsibility to avoid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Level-filtered dispatcher owning an ordered list of handlers.
pub struct Logger {
    name: String,
    min_level: LogLevel,
    max_level: LogLevel,
    time_format: Option<String>,
    handlers: Vec<(HandlerId, Box<dyn Handler>)>,
    next_id: u64,
}

impl Logger {
    /// Create a logger accepting `Info..=Critical` with ISO timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::Info,
            max_level: LogLevel::Critical,
            time_format: None,
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    /// Override the inclusive level bounds.
    pub fn with_bounds(mut self, min_level: LogLevel, max_level: LogLevel) -> Self {
        self.min_level = min_level;
        self.max_level = max_level;
        self
    }

    /// Override the display timestamp format (`chrono` strftime syntax).
    ///
    /// Without an override, `asctime` uses the ISO-8601 rendering.
    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = Some(time_format.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn max_level(&self) -> LogLevel {
        self.max_level
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Append a handler; fan-out preserves insertion order.
    pub fn add_handler(&mut self, handler: Box<dyn Handler>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    /// Remove the handler registered under `id`, returning it.
    pub fn remove_handler(&mut self, id: HandlerId) -> Result<Box<dyn Handler>, HandlerNotFound> {
        let index = self
            .handlers
            .iter()
            .position(|(hid, _)| *hid == id)
            .ok_or(HandlerNotFound)?;
        Ok(self.handlers.remove(index).1)
    }

    /// Log `message` at `level`.
    ///
    /// Records outside the configured bounds are silently dropped. Handler
    /// errors of the invalid-level kind are absorbed and re-reported as
    /// ERROR entries; any other handler error aborts the remaining fan-out
    /// and surfaces to the caller.
    pub fn log(&mut self, level: LogLevel, message: &str) -> Result<(), HandlerError> {
        if level < self.min_level || level > self.max_level {
            return Ok(());
        }
        let record = self.build_record(level, message);
        let absorbed = self.dispatch(&record)?;
        for notice in absorbed {
            self.report_internal_error(&notice)?;
        }
        Ok(())
    }

    /// Log with a level given by name.
    ///
    /// An unrecognised name never surfaces to the caller: the failure is
    /// redirected into an ERROR-level entry instead. This is distinct from
    /// the silent drop applied to out-of-range levels.
    pub fn log_named(&mut self, level: &str, message: &str) -> Result<(), HandlerError> {
        match level.parse::<LogLevel>() {
            Ok(level) => self.log(level, message),
            Err(err) => self.report_internal_error(&err.to_string()),
        }
    }

    pub fn debug(&mut self, message: &str) -> Result<(), HandlerError> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&mut self, message: &str) -> Result<(), HandlerError> {
        self.log(LogLevel::Info, message)
    }

    pub fn warning(&mut self, message: &str) -> Result<(), HandlerError> {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&mut self, message: &str) -> Result<(), HandlerError> {
        self.log(LogLevel::Error, message)
    }

    pub fn critical(&mut self, message: &str) -> Result<(), HandlerError> {
        self.log(LogLevel::Critical, message)
    }

    /// Build a record with both timestamps taken from one clock read.
    fn build_record(&self, level: LogLevel, message: &str) -> LogRecord {
        let now = Utc::now();
        let iso_8601_time = now.format(ISO_8601_FORMAT).to_string();
        let asctime = match &self.time_format {
            Some(format) => now.format(format).to_string(),
            None => iso_8601_time.clone(),
        };
        LogRecord::new(&self.name, iso_8601_time, asctime, level, message)
    }

    /// Fan the record out in insertion order.
    ///
    /// Returns the messages of absorbed invalid-level errors; the first
    /// error of any other kind aborts the loop.
    fn dispatch(&mut self, record: &LogRecord) -> Result<Vec<String>, HandlerError> {
        let mut absorbed = Vec::new();
        for (_, handler) in &mut self.handlers {
            if let Err(err) = handler.emit(record) {
                if err.is_invalid_level() {
                    absorbed.push(err.to_string());
                } else {
                    return Err(err);
                }
            }
        }
        Ok(absorbed)
    }

    /// Emit an internally generated ERROR entry.
    ///
    /// Invalid-level errors raised while reporting are downgraded to a
    /// `log::warn!` so the redirection can never recurse.
    fn report_internal_error(&mut self, message: &str) -> Result<(), HandlerError> {
        if LogLevel::Error < self.min_level || LogLevel::Error > self.max_level {
            return Ok(());
        }
        let record = self.build_record(LogLevel::Error, message);
        for (_, handler) in &mut self.handlers {
            if let Err(err) = handler.emit(&record) {
                if err.is_invalid_level() {
                    log::warn!("logkit: handler rejected internal error entry: {err}");
                } else {
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("max_level", &self.max_level)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
