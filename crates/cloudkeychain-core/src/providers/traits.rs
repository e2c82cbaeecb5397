//! Secure-storage provider trait

use super::error::ProviderResult;
use super::query::Query;

/// The four primitives a provider exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Find,
    Insert,
    Update,
    Remove,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Find => "find",
            Primitive::Insert => "insert",
            Primitive::Update => "update",
            Primitive::Remove => "remove",
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-managed secure store reachable through find/insert/update/remove
///
/// Every call is blocking and may wait on OS-level contention. There is no
/// native upsert: `insert` fails with `Duplicate` when the identity exists and
/// `update` fails with `NotFound` when it does not.
///
/// Implementations:
/// - `MemoryProvider`: In-process emulation with keychain semantics
/// - `KeyringProvider`: OS keychain through the `keyring` crate
pub trait SecureStorageProvider: Send + Sync {
    /// Human-readable name of this provider
    fn name(&self) -> &str;

    /// Whether the backing store can be reached at all
    fn is_available(&self) -> bool {
        true
    }

    /// Look up the first item matching `query`
    ///
    /// Returns `Ok(Some(data))` when `query.return_data` is set, `Ok(None)`
    /// when the query only checks for existence, and `Err(NotFound)` when
    /// nothing matches.
    fn find(&self, query: &Query) -> ProviderResult<Option<Vec<u8>>>;

    /// Create a new item carrying `data`
    fn insert(&self, query: &Query, data: &[u8]) -> ProviderResult<()>;

    /// Replace the payload of every item matching `query`
    fn update(&self, query: &Query, data: &[u8]) -> ProviderResult<()>;

    /// Delete every item matching `query`
    fn remove(&self, query: &Query) -> ProviderResult<()>;
}
