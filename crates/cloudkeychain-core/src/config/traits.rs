//! Configuration source trait and errors

use async_trait::async_trait;

use super::types::KeychainConfig;

/// Where a host application gets its store configuration from
///
/// Implementations:
/// - `FileConfigSource`: YAML file (~/.config/cloudkeychain/config.yaml)
/// - `EnvConfigSource`: `CLOUDKEYCHAIN_*` environment variables
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Human-readable description, used in error messages
    fn describe(&self) -> String;

    /// Load and validate the configuration
    async fn load(&self) -> ConfigResult<KeychainConfig>;
}

/// Errors that can occur while configuring a store
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Shared secret store has not been initialized")]
    NotInitialized,

    #[error("Shared secret store is already initialized")]
    AlreadyInitialized,

    #[error("No configuration directory on this platform")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
