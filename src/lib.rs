//! Level-filtered logging with pluggable sinks.
//!
//! A [`Logger`] filters calls by severity and fans accepted records out
//! synchronously, in insertion order, to any number of [`Handler`] sinks:
//! console, plain file, CSV, JSON, SQLite, or a [`SysHandler`] shipping
//! records to a remote peer over TCP or UDP.
//!
//! ```no_run
//! use logkit::{ConsoleHandler, LogLevel, Logger};
//!
//! let mut logger = Logger::new("app").with_bounds(LogLevel::Debug, LogLevel::Critical);
//! logger.add_handler(Box::new(ConsoleHandler::stdout()));
//! logger.info("started").unwrap();
//! ```
//!
//! Everything is blocking and single-threaded by design: `emit` holds the
//! calling thread for the duration of its I/O, and handlers are not
//! internally synchronized. Share a logger between threads by wrapping it
//! in a mutex, which is what the [`manager`] registry hands out.

pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
pub mod logger;
pub mod manager;
pub mod record;
pub mod sys;

#[cfg(test)]
pub(crate) mod test_utils;

pub use formatter::{DEFAULT_TEMPLATE, Formatter, TemplateFormatter};
pub use handler::{Handler, HandlerError};
pub use handlers::{ConsoleHandler, CsvHandler, FileHandler, JsonHandler, SqlHandler};
pub use level::{LogLevel, ParseLevelError};
pub use logger::{HandlerId, HandlerNotFound, Logger};
pub use manager::{about, basic_logger, get_logger, reset_registry};
pub use record::LogRecord;
pub use sys::{Role, ShutdownHandle, SysHandler, Transport, WireRecord};
