//! Store configuration: validated settings and the sources they load from

mod traits;
mod types;
mod file;
mod env;

pub use traits::{ConfigSource, ConfigError, ConfigResult};
pub use types::{KeychainConfig, DEFAULT_PROVIDER};
pub use file::FileConfigSource;
pub use env::EnvConfigSource;
