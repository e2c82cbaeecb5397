//! Process-wide shared store; lives in its own test binary so the global
//! starts out empty

use cloudkeychain_core::{shared, ConfigError, KeychainConfig, MemoryProvider, SecretStore};
use std::sync::Arc;

#[test]
fn shared_store_initializes_once() {
    assert!(matches!(shared::get(), Err(ConfigError::NotInitialized)));

    let config = KeychainConfig::new("XYZ123456Z.com.example.shared", "com.example.App").unwrap();
    let store = SecretStore::new(config.clone(), Arc::new(MemoryProvider::new()));
    shared::initialize(store).unwrap();
    assert!(shared::is_initialized());

    let replacement = SecretStore::new(
        KeychainConfig::new("OTHER.com.example", "com.example.App").unwrap(),
        Arc::new(MemoryProvider::new()),
    );
    assert!(matches!(
        shared::initialize(replacement),
        Err(ConfigError::AlreadyInitialized)
    ));

    let store = shared::get().unwrap();
    assert_eq!(store.config(), &config);
    assert!(store.store("v", "alice", "openai"));
    assert_eq!(shared::get().unwrap().retrieve("alice"), Some("v".to_string()));
}
