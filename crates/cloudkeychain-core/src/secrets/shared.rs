//! Process-wide shared store
//!
//! For hosts that want a single global store instead of passing a
//! `SecretStore` handle around. It can be initialized exactly once; a second
//! initialization is rejected and the first configuration stays in effect.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::{ConfigError, ConfigResult, KeychainConfig};

use super::store::SecretStore;

static SHARED: OnceCell<Arc<SecretStore>> = OnceCell::new();

/// Install `store` as the shared instance
pub fn initialize(store: SecretStore) -> ConfigResult<Arc<SecretStore>> {
    let store = Arc::new(store);
    SHARED
        .set(Arc::clone(&store))
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(store)
}

/// Build a store from `config` through the provider registry and install it
pub fn initialize_with(config: KeychainConfig) -> ConfigResult<Arc<SecretStore>> {
    if SHARED.get().is_some() {
        return Err(ConfigError::AlreadyInitialized);
    }
    initialize(SecretStore::from_config(config)?)
}

/// The shared instance, or `NotInitialized` before [`initialize`] ran
pub fn get() -> ConfigResult<Arc<SecretStore>> {
    SHARED.get().cloned().ok_or(ConfigError::NotInitialized)
}

pub fn is_initialized() -> bool {
    SHARED.get().is_some()
}
