//! File-based configuration source (YAML)
//!
//! The user-level file lives at `<config dir>/cloudkeychain/config.yaml`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::traits::{ConfigError, ConfigResult, ConfigSource};
use super::types::KeychainConfig;

/// YAML configuration file
///
/// ```yaml
/// access_group: XYZ123456Z.com.example.App
/// subsystem: com.example.App
/// provider: keyring   # optional
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The user-level config file
    pub fn user() -> ConfigResult<Self> {
        Ok(Self::new(Self::user_config_path()?))
    }

    /// `<config dir>/cloudkeychain/config.yaml`
    pub fn user_config_path() -> ConfigResult<PathBuf> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("cloudkeychain");
        path.push("config.yaml");
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write `config` to the file, creating parent directories as needed
    pub async fn save(&self, config: &KeychainConfig) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let yaml = serde_yaml::to_string(config)?;
        tokio::fs::write(&self.path, yaml).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn load(&self) -> ConfigResult<KeychainConfig> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
