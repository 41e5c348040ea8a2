//! Global registry mapping logger names to instances.
//!
//! Loggers are handed out as `Arc<Mutex<Logger>>` because emitting needs
//! exclusive access to each handler's resources; the mutex is the external
//! synchronization the concurrency contract leaves to callers.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

use crate::handler::HandlerError;
use crate::handlers::{ConsoleHandler, FileHandler};
use crate::logger::Logger;

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<Mutex<Logger>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Retrieve the logger registered under `name`, creating it on first use.
pub fn get_logger(name: &str) -> Arc<Mutex<Logger>> {
    let mut registry = REGISTRY.write();
    registry
        .entry(name.to_owned())
        .or_insert_with(|| Arc::new(Mutex::new(Logger::new(name))))
        .clone()
}

/// Retrieve `name`'s logger with a file handler and a console handler
/// pre-attached.
///
/// Handlers are attached only when the logger has none yet, so repeated
/// calls do not double deliveries. The file handler writes under `logs/`
/// in the working directory.
pub fn basic_logger(name: &str) -> Result<Arc<Mutex<Logger>>, HandlerError> {
    let logger = get_logger(name);
    {
        let mut guard = logger.lock();
        if guard.handler_count() == 0 {
            guard.add_handler(Box::new(FileHandler::new(name)?));
            guard.add_handler(Box::new(ConsoleHandler::stdout()));
        }
    }
    Ok(logger)
}

/// Drop every registered logger. Intended for tests.
pub fn reset_registry() {
    REGISTRY.write().clear();
}

/// Package banner, produced on request rather than as an import side
/// effect.
pub fn about() -> String {
    format!(
        "{} {} - {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION"),
    )
}
