//! Record formatting.
//!
//! Sinks render records through a [`Formatter`]. The stock implementation
//! is [`TemplateFormatter`], which substitutes `{key}` placeholders with a
//! record's field values.

use crate::record::LogRecord;

/// Default line template used by the console, file, and network sinks.
pub const DEFAULT_TEMPLATE: &str = "{asctime}: [{loggername}]: [{loglevel}]: {message}";

/// Trait for formatting log records into strings.
pub trait Formatter: Send {
    /// Format a log record into a string representation.
    fn format(&self, record: &LogRecord) -> String;
}

/// Formatter substituting `{key}` placeholders from a record's fields.
///
/// Placeholders with no matching field are left intact, so templates can
/// carry keys that only some render sites supply (the network server adds
/// `{client_addr}` and `{client_name}` on top of the record fields).
#[derive(Clone, Debug)]
pub struct TemplateFormatter {
    template: String,
}

impl TemplateFormatter {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute an explicit set of `(key, value)` pairs.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut out = self.template.clone();
        for (key, value) in values {
            let placeholder = format!("{{{key}}}");
            if out.contains(&placeholder) {
                out = out.replace(&placeholder, value);
            }
        }
        out
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for TemplateFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl Formatter for TemplateFormatter {
    fn format(&self, record: &LogRecord) -> String {
        self.render(&record.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;

    fn record() -> LogRecord {
        LogRecord::new("app", "2024-01-01T00:00:00+0000", "00:00:00", LogLevel::Info, "hi")
    }

    #[test]
    fn default_template_renders_all_fields() {
        let line = TemplateFormatter::default().format(&record());
        assert_eq!(line, "00:00:00: [app]: [INFO]: hi");
    }

    #[test]
    fn unknown_placeholders_are_left_intact() {
        let formatter = TemplateFormatter::new("{message} from {client_addr}");
        assert_eq!(formatter.format(&record()), "hi from {client_addr}");
    }

    #[test]
    fn render_accepts_extra_pairs() {
        let formatter = TemplateFormatter::new("{message} from {client_addr}");
        let line = formatter.render(&[("message", "hi"), ("client_addr", "127.0.0.1:9")]);
        assert_eq!(line, "hi from 127.0.0.1:9");
    }
}
