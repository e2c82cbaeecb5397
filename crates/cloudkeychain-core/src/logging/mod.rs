//! Logging abstractions for runtime-agnostic diagnostics

mod traits;
mod noop;
mod console;
mod recording;

pub use traits::{Logger, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::{ConsoleLogger, SECURITY_CATEGORY};
pub use recording::RecordingLogger;
