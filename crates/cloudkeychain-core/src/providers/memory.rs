//! In-memory provider with keychain semantics

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use super::error::{ProviderError, ProviderResult};
use super::query::{ItemClass, Query};
use super::traits::{Primitive, SecureStorageProvider};

#[derive(Debug, Clone)]
struct StoredItem {
    class: ItemClass,
    account: String,
    service: String,
    access_group: String,
    synchronizable: bool,
    data: Vec<u8>,
}

impl StoredItem {
    fn matches(&self, query: &Query) -> bool {
        self.class == query.class
            && self.account == query.account
            && self.access_group == query.access_group
            && self.synchronizable == query.synchronizable
            && query.service.as_deref().map_or(true, |s| s == self.service)
    }
}

/// In-process secure store for tests and ephemeral use
///
/// Behaves like the platform keychain: items are unique per
/// (class, account, service, access group, synchronizable), a query without a
/// service matches any service (first inserted wins), `insert` rejects
/// duplicates and `update`/`remove` report `NotFound` when nothing matches.
///
/// Failures can be injected per primitive with [`MemoryProvider::fail_next`],
/// and every primitive call is recorded for inspection.
///
/// # Example
///
/// ```
/// use cloudkeychain_core::providers::{MemoryProvider, Query, SecureStorageProvider};
///
/// let provider = MemoryProvider::new();
/// let query = Query::new("alice", "group").with_service("openai");
/// provider.insert(&query, b"sk-test").unwrap();
/// assert_eq!(provider.find(&query.clone().returning_data()).unwrap(), Some(b"sk-test".to_vec()));
/// ```
#[derive(Debug, Default)]
pub struct MemoryProvider {
    items: RwLock<Vec<StoredItem>>,
    faults: Mutex<HashMap<Primitive, i32>>,
    calls: Mutex<Vec<Primitive>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `primitive` fail with status `code`
    pub fn fail_next(&self, primitive: Primitive, code: i32) {
        self.faults.lock().insert(primitive, code);
    }

    /// Primitives called so far, oldest first
    pub fn calls(&self) -> Vec<Primitive> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Number of stored items across all access groups
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored item
    pub fn clear(&self) {
        self.items.write().clear();
    }

    fn enter(&self, primitive: Primitive) -> ProviderResult<()> {
        self.calls.lock().push(primitive);
        match self.faults.lock().remove(&primitive) {
            Some(code) => Err(ProviderError::from_code(code)),
            None => Ok(()),
        }
    }
}

impl SecureStorageProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn find(&self, query: &Query) -> ProviderResult<Option<Vec<u8>>> {
        self.enter(Primitive::Find)?;
        let items = self.items.read();
        let item = items
            .iter()
            .find(|item| item.matches(query))
            .ok_or(ProviderError::NotFound)?;
        Ok(query.return_data.then(|| item.data.clone()))
    }

    fn insert(&self, query: &Query, data: &[u8]) -> ProviderResult<()> {
        self.enter(Primitive::Insert)?;
        let service = query.stored_service();
        let mut items = self.items.write();
        let exists = items.iter().any(|item| {
            item.class == query.class
                && item.account == query.account
                && item.service == service
                && item.access_group == query.access_group
                && item.synchronizable == query.synchronizable
        });
        if exists {
            return Err(ProviderError::Duplicate);
        }
        items.push(StoredItem {
            class: query.class,
            account: query.account.clone(),
            service: service.to_string(),
            access_group: query.access_group.clone(),
            synchronizable: query.synchronizable,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn update(&self, query: &Query, data: &[u8]) -> ProviderResult<()> {
        self.enter(Primitive::Update)?;
        let mut items = self.items.write();
        let mut updated = false;
        for item in items.iter_mut().filter(|item| item.matches(query)) {
            item.data = data.to_vec();
            updated = true;
        }
        if updated {
            Ok(())
        } else {
            Err(ProviderError::NotFound)
        }
    }

    fn remove(&self, query: &Query) -> ProviderResult<()> {
        self.enter(Primitive::Remove)?;
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|item| !item.matches(query));
        if items.len() < before {
            Ok(())
        } else {
            Err(ProviderError::NotFound)
        }
    }
}
