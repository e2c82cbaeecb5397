//! Console logger implementation

use super::traits::{LogLevel, Logger};

/// Category every store logger is tagged with
pub const SECURITY_CATEGORY: &str = "security";

/// A logger that writes to stderr, tagged with `[subsystem/category]`
///
/// Lines below `min_level` are dropped. The default level comes from
/// `CLOUDKEYCHAIN_LOG_LEVEL` and falls back to `info`.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl ConsoleLogger {
    /// Create a console logger for a diagnostic channel
    pub fn new(subsystem: &str, category: &str) -> Self {
        let min_level = std::env::var("CLOUDKEYCHAIN_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Info);
        Self {
            prefix: format!("[{}/{}]", subsystem, category),
            min_level,
        }
    }

    /// Create a console logger for the store's security category
    pub fn security(subsystem: &str) -> Self {
        Self::new(subsystem, SECURITY_CATEGORY)
    }

    /// Override the minimum level
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn emit(&self, level: LogLevel, message: &str) {
        if level >= self.min_level {
            eprintln!("{} {}: {}", self.prefix, level, message);
        }
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }
}
