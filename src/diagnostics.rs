//! Diagnostics sink handed to the components that need to report what they
//! do. The library never installs a logger itself.

use std::cell::RefCell;

use log::Level;

/// Receives diagnostic messages from library components.
pub trait Diagnostics {
    /// Reports `message` at `level`.
    fn log(&self, level: Level, message: &str);

    /// Reports at [`Level::Debug`].
    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Reports at [`Level::Info`].
    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Reports at [`Level::Warn`].
    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Reports at [`Level::Error`].
    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Forwards everything to the `log` facade under a fixed target.
#[derive(Clone, Debug)]
pub struct LogDiagnostics {
    target: &'static str,
}

impl LogDiagnostics {
    /// Logs every message under `target`.
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LogDiagnostics {
    fn default() -> Self {
        Self::new("coffee_counter")
    }
}

impl Diagnostics for LogDiagnostics {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: self.target, level, "{}", message);
    }
}

/// Keeps every message in memory. Useful for asserting on what a component
/// reported.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: RefCell<Vec<(Level, String)>>,
}

impl RecordingDiagnostics {
    /// Starts with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded at exactly `level`, oldest first.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Number of messages at any level.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod test {
    use log::Level;

    use crate::diagnostics::{Diagnostics, LogDiagnostics, RecordingDiagnostics};

    #[test]
    fn test_recording() {
        let diagnostics = RecordingDiagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.info("sale recorded");
        diagnostics.warn("line skipped");
        diagnostics.info("row updated");

        assert_eq!(3, diagnostics.len());
        assert_eq!(
            vec!["sale recorded".to_string(), "row updated".to_string()],
            diagnostics.messages(Level::Info)
        );
        assert_eq!(vec!["line skipped".to_string()], diagnostics.messages(Level::Warn));
        assert!(diagnostics.messages(Level::Error).is_empty());
    }

    #[test]
    fn test_log_forwarding_does_not_panic_without_logger() {
        LogDiagnostics::default().error("nobody is listening");
    }
}
