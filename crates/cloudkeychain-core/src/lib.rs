//! cloudkeychain core
//!
//! Small named secrets (API keys, tokens) in the platform secure store, scoped
//! to an access group so cooperating applications can share them, and flagged
//! synchronizable so the platform can propagate them across the user's devices.
//!
//! Application code talks to a [`SecretStore`] handle and never to the
//! provider primitives directly:
//!
//! ```rust
//! use std::sync::Arc;
//! use cloudkeychain_core::{KeychainConfig, MemoryProvider, SecretStore};
//!
//! let config = KeychainConfig::new("XYZ123456Z.com.example.App", "com.example.App")?;
//! let store = SecretStore::new(config, Arc::new(MemoryProvider::new()));
//!
//! store.store("sk-...", "alice", "openai");
//! let key = store.retrieve("alice");
//! # assert_eq!(key.as_deref(), Some("sk-..."));
//! # Ok::<(), cloudkeychain_core::ConfigError>(())
//! ```

pub mod logging;
pub mod providers;
pub mod config;
pub mod secrets;
pub mod executor;

mod locks;

// Re-export commonly used types
pub use secrets::{SecretStore, StoreError, StoreOutcome, StoreResult, shared};

pub use providers::{
    SecureStorageProvider, Query, Primitive, ProviderError, ProviderResult,
    MemoryProvider, KeyringProvider,
    register_provider, create_provider, list_providers,
};

pub use config::{KeychainConfig, ConfigSource, ConfigError, ConfigResult, FileConfigSource, EnvConfigSource};

pub use logging::{Logger, SharedLogger, NoOpLogger, ConsoleLogger, RecordingLogger, LogLevel};

pub use executor::{SerialExecutor, AsyncSecretStore, ExecutorError};
