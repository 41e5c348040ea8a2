//! Console sink with per-level coloring.

use std::collections::HashMap;
use std::io::{self, Write};

use colored::{Color, Colorize};

use crate::formatter::{Formatter, TemplateFormatter};
use crate::handler::{Handler, HandlerError};
use crate::level::LogLevel;
use crate::record::LogRecord;

/// Handler writing template-rendered, colored lines to a stream.
///
/// The writer is injectable so tests can capture output; `stdout` is the
/// conventional choice for applications.
pub struct ConsoleHandler {
    stream: Box<dyn Write + Send>,
    formatter: TemplateFormatter,
    color_map: HashMap<LogLevel, Color>,
}

impl ConsoleHandler {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn stderr() -> Self {
        Self::with_writer(Box::new(io::stderr()))
    }

    pub fn with_writer(stream: Box<dyn Write + Send>) -> Self {
        Self {
            stream,
            formatter: TemplateFormatter::default(),
            color_map: HashMap::from([
                (LogLevel::Debug, Color::Green),
                (LogLevel::Info, Color::Cyan),
                (LogLevel::Warning, Color::Yellow),
                (LogLevel::Error, Color::Red),
                (LogLevel::Critical, Color::Magenta),
            ]),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.formatter = TemplateFormatter::new(template);
        self
    }

    /// Override the color used for one level.
    pub fn set_color(&mut self, level: LogLevel, color: Color) {
        self.color_map.insert(level, color);
    }

    fn color_for(&self, level: LogLevel) -> Color {
        self.color_map.get(&level).copied().unwrap_or(Color::White)
    }
}

impl Handler for ConsoleHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<(), HandlerError> {
        let line = self.formatter.format(record);
        writeln!(self.stream, "{}", line.as_str().color(self.color_for(record.level)))?;
        self.stream.flush()?;
        Ok(())
    }
}
