//! Access-group scoped secret store
//!
//! Translates store/retrieve/delete requests into provider primitives and
//! provider statuses into boolean or optional outcomes.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::{ConfigError, ConfigResult, ConfigSource, KeychainConfig};
use crate::locks::KeyedLocks;
use crate::logging::{ConsoleLogger, SharedLogger};
use crate::providers::{create_provider, Primitive, ProviderError, SecureStorageProvider};
use crate::{log_debug, log_error, log_info, log_warn};

use super::error::{StoreError, StoreOutcome, StoreResult};
use super::identity::{lookup_query, write_query, IdentityKey};

/// Write locks shared by every store in the process
static WRITE_LOCKS: Lazy<KeyedLocks<IdentityKey>> = Lazy::new(KeyedLocks::new);

/// Secret store bound to one access group
///
/// A store can only be built from a validated [`KeychainConfig`], so the
/// scope is always defined and never changes for the lifetime of the store.
/// Every call round-trips to the provider; nothing is cached.
///
/// # Concurrency
///
/// All operations take `&self` and may be called from many threads. Upserts
/// and deletes of the same identity are serialized within the process. The
/// lookup-then-write sequence is still not atomic against other processes
/// sharing the access group: a peer can create or remove the entry between
/// the lookup and the write, in which case the call fails (duplicate or
/// not-found status) and is not retried.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cloudkeychain_core::config::KeychainConfig;
/// use cloudkeychain_core::providers::MemoryProvider;
/// use cloudkeychain_core::secrets::SecretStore;
///
/// let config = KeychainConfig::new("XYZ123456Z.com.example.App", "com.example.App").unwrap();
/// let store = SecretStore::new(config, Arc::new(MemoryProvider::new()));
///
/// assert!(store.store("sk-test", "alice", "openai"));
/// assert_eq!(store.retrieve("alice"), Some("sk-test".to_string()));
/// assert!(store.delete("alice", "openai"));
/// assert_eq!(store.retrieve("alice"), None);
/// ```
pub struct SecretStore {
    config: KeychainConfig,
    provider: Arc<dyn SecureStorageProvider>,
    logger: SharedLogger,
}

impl SecretStore {
    /// Create a store over `provider`, logging to the console under the
    /// configured subsystem with the `security` category
    pub fn new(config: KeychainConfig, provider: Arc<dyn SecureStorageProvider>) -> Self {
        let logger: SharedLogger = Arc::new(ConsoleLogger::security(config.subsystem()));
        Self {
            config,
            provider,
            logger,
        }
    }

    /// Create a store using the provider registered under `config.provider()`
    pub fn from_config(config: KeychainConfig) -> ConfigResult<Self> {
        let provider = create_provider(config.provider())
            .ok_or_else(|| ConfigError::UnknownProvider(config.provider().to_string()))?;
        Ok(Self::new(config, provider))
    }

    /// Load configuration from `source` and build the store from it
    pub async fn from_source(source: &dyn ConfigSource) -> ConfigResult<Self> {
        let config = source.load().await?;
        Self::from_config(config)
    }

    /// Replace the logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &KeychainConfig {
        &self.config
    }

    /// Scope all entries of this store are bound to
    pub fn access_group(&self) -> &str {
        self.config.access_group()
    }

    pub fn provider(&self) -> &Arc<dyn SecureStorageProvider> {
        &self.provider
    }

    /// Store `payload` under (account, service name), inserting or updating
    ///
    /// Returns `true` when the provider accepted the write. Failures are
    /// logged with the provider status code.
    pub fn store(&self, payload: &str, account: &str, service_name: &str) -> bool {
        self.try_store(payload, account, service_name).is_ok()
    }

    /// Upsert with the outcome or the failing primitive reported
    pub fn try_store(
        &self,
        payload: &str,
        account: &str,
        service_name: &str,
    ) -> StoreResult<StoreOutcome> {
        let data = payload.as_bytes();
        let query = write_query(account, service_name, self.access_group());
        let key = IdentityKey::new(self.access_group(), account, service_name);

        WRITE_LOCKS.with_lock(&key, || match self.provider.find(&query) {
            Ok(_) => match self.provider.update(&query, data) {
                Ok(()) => {
                    log_debug!(
                        self.logger,
                        "Updated secret for account='{}', service='{}' ({} bytes)",
                        account,
                        service_name,
                        data.len()
                    );
                    Ok(StoreOutcome::Updated)
                }
                Err(e) => {
                    log_error!(self.logger, "Error updating key in keychain: {}", e.code());
                    Err(StoreError::provider(Primitive::Update, e))
                }
            },
            Err(ProviderError::NotFound) => match self.provider.insert(&query, data) {
                Ok(()) => {
                    log_debug!(
                        self.logger,
                        "Added secret for account='{}', service='{}' ({} bytes)",
                        account,
                        service_name,
                        data.len()
                    );
                    Ok(StoreOutcome::Inserted)
                }
                Err(e) => {
                    log_error!(self.logger, "Error adding key to keychain: {}", e.code());
                    Err(StoreError::provider(Primitive::Insert, e))
                }
            },
            Err(e) => {
                log_error!(self.logger, "Error searching for key in keychain: {}", e.code());
                Err(StoreError::provider(Primitive::Find, e))
            }
        })
    }

    /// Look up the payload stored for `account` in this scope
    ///
    /// Matches on account and scope only. When several service names share
    /// the account, which entry is returned is up to the provider.
    pub fn retrieve(&self, account: &str) -> Option<String> {
        self.try_retrieve(account).ok().flatten()
    }

    /// Lookup that distinguishes "absent" from provider and decoding failures
    pub fn try_retrieve(&self, account: &str) -> StoreResult<Option<String>> {
        let query = lookup_query(account, self.access_group());
        match self.provider.find(&query) {
            Ok(Some(data)) => match String::from_utf8(data) {
                Ok(payload) => Ok(Some(payload)),
                Err(e) => {
                    log_debug!(self.logger, "Stored payload for account='{}' is not UTF-8", account);
                    Err(StoreError::Decoding(e))
                }
            },
            Ok(None) => {
                log_warn!(self.logger, "Keychain returned no data for account='{}'", account);
                Err(StoreError::MissingPayload)
            }
            Err(ProviderError::NotFound) => {
                log_debug!(self.logger, "Key not found in keychain for account='{}'", account);
                Ok(None)
            }
            Err(e) => {
                log_warn!(self.logger, "Error retrieving key from keychain: {}", e.code());
                Err(StoreError::provider(Primitive::Find, e))
            }
        }
    }

    /// Delete the entry for (account, service name)
    ///
    /// Returns `false` when nothing was deleted, including when the entry did
    /// not exist.
    pub fn delete(&self, account: &str, service_name: &str) -> bool {
        self.try_delete(account, service_name).is_ok()
    }

    /// Delete, reporting a missing entry as a not-found provider error
    pub fn try_delete(&self, account: &str, service_name: &str) -> StoreResult<()> {
        let query = write_query(account, service_name, self.access_group());
        let key = IdentityKey::new(self.access_group(), account, service_name);

        WRITE_LOCKS.with_lock(&key, || match self.provider.remove(&query) {
            Ok(()) => {
                log_debug!(self.logger, "Key successfully deleted from keychain");
                Ok(())
            }
            Err(ProviderError::NotFound) => {
                log_info!(
                    self.logger,
                    "Deleting key failed because the key was not found in keychain"
                );
                Err(StoreError::provider(Primitive::Remove, ProviderError::NotFound))
            }
            Err(e) => {
                log_error!(self.logger, "Error deleting key from keychain: {}", e.code());
                Err(StoreError::provider(Primitive::Remove, e))
            }
        })
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStore")
            .field("access_group", &self.config.access_group())
            .field("subsystem", &self.config.subsystem())
            .field("provider", &self.provider.name())
            .finish()
    }
}
