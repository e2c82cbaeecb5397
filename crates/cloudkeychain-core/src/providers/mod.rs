//! Secure-storage providers
//!
//! This module provides the boundary to the platform secure store:
//! - `SecureStorageProvider` trait with the find/insert/update/remove primitives
//! - Built-in implementations: `MemoryProvider`, `KeyringProvider`
//! - A registry for creating providers by name

mod error;
mod query;
mod traits;
mod memory;
mod keyring_store;
mod registry;

pub use error::{status, ProviderError, ProviderResult};
pub use query::{ItemClass, MatchLimit, Query};
pub use traits::{Primitive, SecureStorageProvider};
pub use memory::MemoryProvider;
pub use keyring_store::KeyringProvider;
pub use registry::{
    create_provider, has_provider, list_providers, register_provider, unregister_provider,
    ProviderDefinition, ProviderFactory,
};
