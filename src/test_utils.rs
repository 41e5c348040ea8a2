//! Shared test support.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::handler::{Handler, HandlerError};
use crate::record::LogRecord;

/// Handler that stores every record it receives.
///
/// Clones share the same backing store, so a test can keep one clone and
/// hand another to a logger (or move it into a server thread) while still
/// observing deliveries.
#[derive(Clone, Default)]
pub(crate) struct CollectingHandler {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }
}

impl Handler for CollectingHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Handler whose `emit` always fails with the produced error.
pub(crate) struct FailingHandler {
    make: Box<dyn Fn() -> HandlerError + Send>,
}

impl FailingHandler {
    pub fn new(make: impl Fn() -> HandlerError + Send + 'static) -> Self {
        Self {
            make: Box::new(make),
        }
    }
}

impl Handler for FailingHandler {
    fn emit(&mut self, _record: &LogRecord) -> Result<(), HandlerError> {
        Err((self.make)())
    }
}
