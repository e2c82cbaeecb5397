//! Recording logger for assertions in tests and host diagnostics

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// A logger that keeps every line in memory
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines, oldest first
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    /// Recorded lines at exactly `level`
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any line at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.lock().push((level, message.to_string()));
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_logger_captures_levels() {
        let logger = RecordingLogger::new();
        logger.info("hello");
        logger.error(&format!("status {}", -25300));
        logger.log(LogLevel::Warn, "careful");

        assert_eq!(logger.entries().len(), 3);
        assert_eq!(logger.messages_at(LogLevel::Error), vec!["status -25300".to_string()]);
        assert!(logger.contains(LogLevel::Warn, "care"));
        assert!(!logger.contains(LogLevel::Debug, "hello"));

        logger.clear();
        assert!(logger.entries().is_empty());
    }
}
