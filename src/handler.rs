use std::io;

use thiserror::Error;

use crate::level::ParseLevelError;
use crate::record::LogRecord;

/// Errors surfaced by a handler's [`emit`](Handler::emit) or by handler
/// construction.
///
/// Variants are deliberately discriminable: callers may retry on
/// [`ServerUnreachable`](HandlerError::ServerUnreachable) but a role
/// violation is a programming error and should never be retried.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Underlying sink I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Record could not be encoded to or decoded from JSON.
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
    /// CSV sink failure.
    #[error("failed to write CSV row: {0}")]
    Csv(#[from] csv::Error),
    /// SQLite sink failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// A level name outside the supported set was given.
    #[error(transparent)]
    InvalidLevel(#[from] ParseLevelError),
    /// The client could not establish a connection to the log server.
    #[error("failed to connect to the log server at {host}:{port}")]
    ServerUnreachable {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    /// A client-only method was invoked on a server-role handler.
    #[error("this method can only be called by a client-role handler")]
    ClientMethodCall,
    /// A server-only method was invoked on a client-role handler.
    #[error("this method can only be called by a server-role handler")]
    ServerMethodCall,
}

/// Trait implemented by all log sinks.
///
/// `Handler` is `Send` so loggers can move between threads, but emitting
/// is a `&mut self` operation: each handler instance owns its resources
/// (file, socket, database connection) and is used from one thread at a
/// time. Callers needing shared access wrap the logger in a mutex, which
/// is what the registry hands out.
pub trait Handler: Send {
    /// Process one record.
    ///
    /// Must not fail for well-formed input; I/O-class failures propagate
    /// to the logger's fan-out loop.
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError>;
}

impl HandlerError {
    /// Whether this error is the invalid-level kind the logger absorbs
    /// during fan-out instead of aborting the call.
    pub(crate) fn is_invalid_level(&self) -> bool {
        matches!(self, HandlerError::InvalidLevel(_))
    }
}
