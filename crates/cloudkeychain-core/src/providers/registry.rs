//! Provider registry for creating secure-storage backends by name

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::keyring_store::KeyringProvider;
use super::memory::MemoryProvider;
use super::traits::SecureStorageProvider;

/// Factory function type for creating providers
pub type ProviderFactory = Box<dyn Fn() -> Arc<dyn SecureStorageProvider> + Send + Sync>;

/// Definition of a registered provider
pub struct ProviderDefinition {
    pub name: String,
    pub description: String,
    pub factory: ProviderFactory,
}

impl std::fmt::Debug for ProviderDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

static REGISTRY: Lazy<RwLock<HashMap<String, ProviderDefinition>>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert(
        "memory".to_string(),
        ProviderDefinition {
            name: "memory".to_string(),
            description: "In-process store with keychain semantics, for tests".to_string(),
            factory: Box::new(|| Arc::new(MemoryProvider::new())),
        },
    );

    map.insert(
        "keyring".to_string(),
        ProviderDefinition {
            name: "keyring".to_string(),
            description: "System keychain (macOS Keychain, Windows Credential Manager, Linux Secret Service)".to_string(),
            factory: Box::new(|| Arc::new(KeyringProvider::new())),
        },
    );

    RwLock::new(map)
});

/// Register a provider under `name`, replacing any previous registration
///
/// # Example
///
/// ```
/// use cloudkeychain_core::providers::{register_provider, create_provider, MemoryProvider};
/// use std::sync::Arc;
///
/// register_provider("scratch", "Scratch store", Box::new(|| Arc::new(MemoryProvider::new())));
/// assert!(create_provider("scratch").is_some());
/// ```
pub fn register_provider(name: &str, description: &str, factory: ProviderFactory) {
    REGISTRY.write().insert(
        name.to_string(),
        ProviderDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    );
}

/// Create a provider by name, or `None` if nothing is registered under it
pub fn create_provider(name: &str) -> Option<Arc<dyn SecureStorageProvider>> {
    REGISTRY.read().get(name).map(|def| (def.factory)())
}

/// List registered providers as (name, description) pairs, sorted by name
pub fn list_providers() -> Vec<(String, String)> {
    let mut providers: Vec<_> = REGISTRY
        .read()
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    providers.sort();
    providers
}

pub fn has_provider(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Remove a registration (mainly for tests)
pub fn unregister_provider(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_providers_registered() {
        assert!(has_provider("memory"));
        assert!(has_provider("keyring"));
    }

    #[test]
    fn test_create_memory_provider() {
        let provider = create_provider("memory").unwrap();
        assert_eq!(provider.name(), "memory");
    }

    #[test]
    fn test_create_unknown_provider() {
        assert!(create_provider("nonexistent_xyz").is_none());
    }

    #[test]
    fn test_list_providers() {
        let names: Vec<_> = list_providers().into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"memory".to_string()));
        assert!(names.contains(&"keyring".to_string()));
    }

    #[test]
    fn test_register_custom_provider() {
        register_provider(
            "test_custom_provider",
            "A test provider",
            Box::new(|| Arc::new(MemoryProvider::new())),
        );
        assert!(has_provider("test_custom_provider"));
        assert_eq!(create_provider("test_custom_provider").unwrap().name(), "memory");

        assert!(unregister_provider("test_custom_provider"));
        assert!(!has_provider("test_custom_provider"));
    }
}
