//! System keychain provider
//!
//! Uses the OS keychain through the `keyring` crate:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use once_cell::sync::Lazy;

use crate::locks::KeyedLocks;

use super::error::{status, ProviderError, ProviderResult};
use super::query::Query;
use super::traits::SecureStorageProvider;

/// Suffix of the per-account entry that lists the service names in use
const INDEX_SUFFIX: &str = "#services";

/// Index locks keyed by (access group, account), shared by every provider
static INDEX_LOCKS: Lazy<KeyedLocks<(String, String)>> = Lazy::new(KeyedLocks::new);

/// Provider backed by the system keychain
///
/// Items live under the keyring service `"{access_group}/{service}"` with the
/// account as the keyring user. The OS APIs cannot search by account alone,
/// so the provider also maintains one index entry per (access group, account)
/// holding the JSON list of service names it has written. Lookups without a
/// service walk that list in insertion order.
///
/// Index maintenance is best effort. Once the item itself is written or
/// deleted the primitive succeeds, and a lost or corrupt index is rebuilt the
/// next time the item is addressed by its service name. Calls for the same
/// (access group, account) are serialized within the process.
///
/// The `synchronizable` attribute cannot be expressed through `keyring`; it
/// is accepted and ignored, so entries stay device-local on this backend.
#[derive(Debug, Default)]
pub struct KeyringProvider {
    _private: (),
}

impl KeyringProvider {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn entry(&self, target: &str, account: &str) -> ProviderResult<Entry> {
        Entry::new(target, account).map_err(map_keyring_error)
    }

    fn item_entry(&self, query: &Query, service: &str) -> ProviderResult<Entry> {
        self.entry(&item_target(&query.access_group, service), &query.account)
    }

    fn index_entry(&self, query: &Query) -> ProviderResult<Entry> {
        self.entry(&index_target(&query.access_group), &query.account)
    }

    fn locked<R>(&self, query: &Query, f: impl FnOnce() -> R) -> R {
        let key = (query.access_group.clone(), query.account.clone());
        INDEX_LOCKS.with_lock(&key, f)
    }

    fn read_raw_index(&self, query: &Query) -> ProviderResult<Option<Vec<u8>>> {
        match self.index_entry(query)?.get_secret() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    fn read_index(&self, query: &Query) -> ProviderResult<Vec<String>> {
        match self.read_raw_index(query)? {
            Some(raw) => serde_json::from_slice(&raw).map_err(|e| {
                ProviderError::status(status::INTERNAL, format!("corrupt service index: {}", e))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Index contents for rewriting; a corrupt index reads as empty
    fn read_index_for_rewrite(&self, query: &Query) -> ProviderResult<Vec<String>> {
        Ok(self
            .read_raw_index(query)?
            .and_then(|raw| serde_json::from_slice(&raw).ok())
            .unwrap_or_default())
    }

    fn write_index(&self, query: &Query, services: &[String]) -> ProviderResult<()> {
        let entry = self.index_entry(query)?;
        if services.is_empty() {
            return match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(map_keyring_error(e)),
            };
        }
        let raw = serde_json::to_vec(services).map_err(|e| {
            ProviderError::status(status::INTERNAL, format!("cannot encode service index: {}", e))
        })?;
        entry.set_secret(&raw).map_err(map_keyring_error)
    }

    /// Add `service` to the index unless it is already listed
    fn ensure_indexed(&self, query: &Query, service: &str) -> ProviderResult<()> {
        let mut services = self.read_index_for_rewrite(query)?;
        if services.iter().any(|s| s == service) {
            return Ok(());
        }
        services.push(service.to_string());
        self.write_index(query, &services)
    }

    fn forget_services(&self, query: &Query, removed: &[String]) -> ProviderResult<()> {
        let remaining: Vec<String> = self
            .read_index_for_rewrite(query)?
            .into_iter()
            .filter(|s| !removed.contains(s))
            .collect();
        self.write_index(query, &remaining)
    }

    /// Service names the query addresses that currently hold an item
    fn live_services(&self, query: &Query) -> ProviderResult<Vec<String>> {
        let candidates = match &query.service {
            Some(service) => vec![service.clone()],
            None => self.read_index(query)?,
        };
        let mut live = Vec::new();
        for service in candidates {
            match self.item_entry(query, &service)?.get_secret() {
                Ok(_) => live.push(service),
                Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(map_keyring_error(e)),
            }
        }
        Ok(live)
    }

    fn find_locked(&self, query: &Query) -> ProviderResult<Option<Vec<u8>>> {
        let service = self
            .live_services(query)?
            .into_iter()
            .next()
            .ok_or(ProviderError::NotFound)?;
        if query.service.is_some() {
            let _ = self.ensure_indexed(query, &service);
        }
        if !query.return_data {
            return Ok(None);
        }
        let data = self
            .item_entry(query, &service)?
            .get_secret()
            .map_err(map_keyring_error)?;
        Ok(Some(data))
    }

    fn insert_locked(&self, query: &Query, data: &[u8]) -> ProviderResult<()> {
        let service = query.stored_service();
        let entry = self.item_entry(query, service)?;
        match entry.get_secret() {
            Ok(_) => return Err(ProviderError::Duplicate),
            Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(map_keyring_error(e)),
        }
        entry.set_secret(data).map_err(map_keyring_error)?;
        let _ = self.ensure_indexed(query, service);
        Ok(())
    }

    fn update_locked(&self, query: &Query, data: &[u8]) -> ProviderResult<()> {
        let live = self.live_services(query)?;
        if live.is_empty() {
            return Err(ProviderError::NotFound);
        }
        for service in &live {
            self.item_entry(query, service)?
                .set_secret(data)
                .map_err(map_keyring_error)?;
        }
        if let Some(service) = &query.service {
            let _ = self.ensure_indexed(query, service);
        }
        Ok(())
    }

    fn remove_locked(&self, query: &Query) -> ProviderResult<()> {
        let live = self.live_services(query)?;
        if live.is_empty() {
            return Err(ProviderError::NotFound);
        }
        for service in &live {
            match self.item_entry(query, service)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(map_keyring_error(e)),
            }
        }
        let _ = self.forget_services(query, &live);
        Ok(())
    }
}

fn item_target(access_group: &str, service: &str) -> String {
    format!("{}/{}", access_group, service)
}

fn index_target(access_group: &str) -> String {
    format!("{}{}", access_group, INDEX_SUFFIX)
}

fn map_keyring_error(err: keyring::Error) -> ProviderError {
    let message = err.to_string();
    match err {
        keyring::Error::NoEntry => ProviderError::NotFound,
        keyring::Error::NoStorageAccess(_) => {
            ProviderError::status(status::INTERACTION_NOT_ALLOWED, message)
        }
        keyring::Error::TooLong(..) | keyring::Error::Invalid(..) => {
            ProviderError::status(status::PARAM, message)
        }
        _ => ProviderError::status(status::INTERNAL, message),
    }
}

impl SecureStorageProvider for KeyringProvider {
    fn name(&self) -> &str {
        "keyring"
    }

    fn is_available(&self) -> bool {
        // Fails on headless hosts without a keychain daemon
        Entry::new("cloudkeychain/__availability_check__", "availability").is_ok()
    }

    fn find(&self, query: &Query) -> ProviderResult<Option<Vec<u8>>> {
        self.locked(query, || self.find_locked(query))
    }

    fn insert(&self, query: &Query, data: &[u8]) -> ProviderResult<()> {
        self.locked(query, || self.insert_locked(query, data))
    }

    fn update(&self, query: &Query, data: &[u8]) -> ProviderResult<()> {
        self.locked(query, || self.update_locked(query, data))
    }

    fn remove(&self, query: &Query) -> ProviderResult<()> {
        self.locked(query, || self.remove_locked(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// In-process credential store installed as the keyring default
    mod mock {
        use std::any::Any;
        use std::collections::{HashMap, HashSet};
        use std::sync::Once;
        use std::thread;
        use std::time::Duration;

        use keyring::credential::{Credential, CredentialApi, CredentialBuilderApi};
        use once_cell::sync::Lazy;
        use parking_lot::Mutex;

        use super::super::INDEX_SUFFIX;

        /// Widens the window between reading and rewriting an index
        const INDEX_READ_DELAY: Duration = Duration::from_millis(50);

        static CREDENTIALS: Lazy<Mutex<HashMap<(String, String), Vec<u8>>>> =
            Lazy::new(|| Mutex::new(HashMap::new()));
        static READ_ONLY: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

        struct MockBuilder;

        impl CredentialBuilderApi for MockBuilder {
            fn build(
                &self,
                _target: Option<&str>,
                service: &str,
                user: &str,
            ) -> keyring::Result<Box<Credential>> {
                Ok(Box::new(MockCredential {
                    service: service.to_string(),
                    user: user.to_string(),
                }))
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        struct MockCredential {
            service: String,
            user: String,
        }

        impl MockCredential {
            fn key(&self) -> (String, String) {
                (self.service.clone(), self.user.clone())
            }
        }

        impl CredentialApi for MockCredential {
            fn set_secret(&self, secret: &[u8]) -> keyring::Result<()> {
                if READ_ONLY.lock().contains(&self.service) {
                    return Err(keyring::Error::PlatformFailure("write denied".into()));
                }
                CREDENTIALS.lock().insert(self.key(), secret.to_vec());
                Ok(())
            }

            fn get_secret(&self) -> keyring::Result<Vec<u8>> {
                if self.service.ends_with(INDEX_SUFFIX) {
                    thread::sleep(INDEX_READ_DELAY);
                }
                CREDENTIALS
                    .lock()
                    .get(&self.key())
                    .cloned()
                    .ok_or(keyring::Error::NoEntry)
            }

            fn delete_credential(&self) -> keyring::Result<()> {
                CREDENTIALS
                    .lock()
                    .remove(&self.key())
                    .map(|_| ())
                    .ok_or(keyring::Error::NoEntry)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        pub fn install() {
            static INSTALL: Once = Once::new();
            INSTALL.call_once(|| keyring::set_default_credential_builder(Box::new(MockBuilder)));
        }

        /// Make every write to the keyring service `service` fail
        pub fn deny_writes(service: &str) {
            READ_ONLY.lock().insert(service.to_string());
        }
    }

    fn query(group: &str, account: &str, service: &str) -> Query {
        Query::new(account, group)
            .with_service(service)
            .synchronizable(true)
    }

    fn lookup(group: &str, account: &str) -> Query {
        Query::new(account, group).synchronizable(true).returning_data()
    }

    fn corrupt_index(group: &str, account: &str) {
        Entry::new(&index_target(group), account)
            .unwrap()
            .set_secret(b"not json")
            .unwrap();
    }

    #[test]
    fn test_name() {
        assert_eq!(KeyringProvider::new().name(), "keyring");
    }

    #[test]
    fn test_item_target() {
        assert_eq!(item_target("TEAM.com.example", "openai"), "TEAM.com.example/openai");
        assert_eq!(index_target("TEAM.com.example"), "TEAM.com.example#services");
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(map_keyring_error(keyring::Error::NoEntry), ProviderError::NotFound);
        let err = map_keyring_error(keyring::Error::Invalid("service".into(), "empty".into()));
        assert_eq!(err.code(), status::PARAM);
    }

    #[test]
    fn test_lookup_across_services() {
        mock::install();
        let group = "test-lookup-group";
        let provider = KeyringProvider::new();

        provider.insert(&query(group, "alice", "openai"), b"sk-openai").unwrap();
        provider.insert(&query(group, "alice", "anthropic"), b"sk-anthropic").unwrap();
        assert_eq!(
            provider.insert(&query(group, "alice", "openai"), b"again"),
            Err(ProviderError::Duplicate)
        );
        assert_eq!(
            provider.find(&lookup(group, "alice")).unwrap(),
            Some(b"sk-openai".to_vec())
        );

        provider.remove(&query(group, "alice", "openai")).unwrap();
        assert_eq!(
            provider.find(&lookup(group, "alice")).unwrap(),
            Some(b"sk-anthropic".to_vec())
        );
        assert_eq!(
            provider.read_index(&lookup(group, "alice")).unwrap(),
            vec!["anthropic".to_string()]
        );

        provider.remove(&query(group, "alice", "anthropic")).unwrap();
        assert_eq!(provider.find(&lookup(group, "alice")), Err(ProviderError::NotFound));
        assert!(provider.read_index(&lookup(group, "alice")).unwrap().is_empty());
        assert_eq!(
            provider.remove(&query(group, "alice", "anthropic")),
            Err(ProviderError::NotFound)
        );
    }

    #[test]
    fn test_update_replaces_payload() {
        mock::install();
        let group = "test-update-group";
        let provider = KeyringProvider::new();

        assert_eq!(
            provider.update(&query(group, "alice", "openai"), b"x"),
            Err(ProviderError::NotFound)
        );
        provider.insert(&query(group, "alice", "openai"), b"v1").unwrap();
        provider.update(&query(group, "alice", "openai"), b"v2").unwrap();
        assert_eq!(provider.find(&lookup(group, "alice")).unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn test_concurrent_inserts_keep_every_service() {
        mock::install();
        let group = "test-concurrent-group";
        let provider = Arc::new(KeyringProvider::new());

        let handles: Vec<_> = ["openai", "anthropic"]
            .into_iter()
            .map(|service| {
                let provider = Arc::clone(&provider);
                thread::spawn(move || {
                    provider.insert(&query(group, "alice", service), service.as_bytes())
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let mut indexed = provider.read_index(&lookup(group, "alice")).unwrap();
        indexed.sort();
        assert_eq!(indexed, vec!["anthropic".to_string(), "openai".to_string()]);

        provider.remove(&query(group, "alice", "openai")).unwrap();
        assert_eq!(
            provider.find(&lookup(group, "alice")).unwrap(),
            Some(b"anthropic".to_vec())
        );
    }

    #[test]
    fn test_unindexed_item_is_reindexed() {
        mock::install();
        let group = "test-reindex-group";
        let provider = KeyringProvider::new();

        Entry::new(&item_target(group, "openai"), "alice")
            .unwrap()
            .set_secret(b"sk-openai")
            .unwrap();
        assert_eq!(provider.find(&lookup(group, "alice")), Err(ProviderError::NotFound));

        assert_eq!(provider.find(&query(group, "alice", "openai")).unwrap(), None);
        assert_eq!(
            provider.find(&lookup(group, "alice")).unwrap(),
            Some(b"sk-openai".to_vec())
        );
    }

    #[test]
    fn test_corrupt_index_does_not_fail_writes() {
        mock::install();
        let group = "test-corrupt-group";
        let provider = KeyringProvider::new();

        corrupt_index(group, "alice");
        assert!(provider.read_index(&lookup(group, "alice")).is_err());

        provider.insert(&query(group, "alice", "openai"), b"sk-openai").unwrap();
        assert_eq!(
            provider.read_index(&lookup(group, "alice")).unwrap(),
            vec!["openai".to_string()]
        );
        assert_eq!(
            provider.find(&lookup(group, "alice")).unwrap(),
            Some(b"sk-openai".to_vec())
        );

        corrupt_index(group, "alice");
        provider.remove(&query(group, "alice", "openai")).unwrap();
        assert_eq!(
            provider.find(&query(group, "alice", "openai")),
            Err(ProviderError::NotFound)
        );
        assert!(provider.read_index(&lookup(group, "alice")).unwrap().is_empty());
    }

    #[test]
    fn test_index_write_failure_keeps_item() {
        mock::install();
        let group = "test-readonly-index-group";
        let provider = KeyringProvider::new();
        mock::deny_writes(&index_target(group));

        provider.insert(&query(group, "alice", "openai"), b"sk-openai").unwrap();
        assert_eq!(
            provider.insert(&query(group, "alice", "openai"), b"again"),
            Err(ProviderError::Duplicate)
        );
        assert_eq!(provider.find(&query(group, "alice", "openai")).unwrap(), None);
        provider.update(&query(group, "alice", "openai"), b"rotated").unwrap();
        provider.remove(&query(group, "alice", "openai")).unwrap();
        assert_eq!(
            provider.find(&query(group, "alice", "openai")),
            Err(ProviderError::NotFound)
        );
    }
}
