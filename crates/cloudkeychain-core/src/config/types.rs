//! Store configuration

use serde::{Deserialize, Serialize};

use super::traits::{ConfigError, ConfigResult};

/// Provider used when the configuration does not name one
pub const DEFAULT_PROVIDER: &str = "keyring";

/// Validated, immutable configuration of a secret store
///
/// Both the access group (scope) and the subsystem (diagnostic channel) are
/// guaranteed non-empty. Values are kept verbatim, no trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct KeychainConfig {
    access_group: String,
    subsystem: String,
    provider: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    access_group: String,
    subsystem: String,
    #[serde(default = "default_provider")]
    provider: String,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

impl TryFrom<RawConfig> for KeychainConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> ConfigResult<Self> {
        Self::new(raw.access_group, raw.subsystem)?.with_provider(raw.provider)
    }
}

impl KeychainConfig {
    /// Create a configuration for an access group and diagnostic subsystem
    ///
    /// # Example
    ///
    /// ```
    /// use cloudkeychain_core::config::KeychainConfig;
    ///
    /// let config = KeychainConfig::new("XYZ123456Z.com.example.App", "com.example.App").unwrap();
    /// assert_eq!(config.provider(), "keyring");
    /// assert!(KeychainConfig::new("", "com.example.App").is_err());
    /// ```
    pub fn new(access_group: impl Into<String>, subsystem: impl Into<String>) -> ConfigResult<Self> {
        let access_group = access_group.into();
        let subsystem = subsystem.into();
        if access_group.is_empty() {
            return Err(ConfigError::Empty("access_group"));
        }
        if subsystem.is_empty() {
            return Err(ConfigError::Empty("subsystem"));
        }
        Ok(Self {
            access_group,
            subsystem,
            provider: default_provider(),
        })
    }

    /// Select the registered provider to build the store with
    pub fn with_provider(mut self, provider: impl Into<String>) -> ConfigResult<Self> {
        let provider = provider.into();
        if provider.is_empty() {
            return Err(ConfigError::Empty("provider"));
        }
        self.provider = provider;
        Ok(self)
    }

    /// Scope every entry of the store is bound to
    pub fn access_group(&self) -> &str {
        &self.access_group
    }

    /// Diagnostic channel the store logs under
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}
