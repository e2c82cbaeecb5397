//! Environment variable configuration source

use async_trait::async_trait;

use super::traits::{ConfigError, ConfigResult, ConfigSource};
use super::types::KeychainConfig;

/// Reads `<PREFIX>_ACCESS_GROUP`, `<PREFIX>_SUBSYSTEM` and the optional
/// `<PREFIX>_PROVIDER`. The default prefix is `CLOUDKEYCHAIN`.
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    prefix: String,
}

impl Default for EnvConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvConfigSource {
    pub fn new() -> Self {
        Self::with_prefix("CLOUDKEYCHAIN")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    fn required(&self, suffix: &str) -> ConfigResult<String> {
        let name = self.var_name(suffix);
        std::env::var(&name).map_err(|_| ConfigError::MissingEnv(name))
    }

    /// Synchronous load, for hosts without an async runtime
    pub fn load_blocking(&self) -> ConfigResult<KeychainConfig> {
        let config = KeychainConfig::new(self.required("ACCESS_GROUP")?, self.required("SUBSYSTEM")?)?;
        match std::env::var(self.var_name("PROVIDER")) {
            Ok(provider) => config.with_provider(provider),
            Err(_) => Ok(config),
        }
    }
}

#[async_trait]
impl ConfigSource for EnvConfigSource {
    fn describe(&self) -> String {
        format!("environment {}_*", self.prefix)
    }

    async fn load(&self) -> ConfigResult<KeychainConfig> {
        self.load_blocking()
    }
}
