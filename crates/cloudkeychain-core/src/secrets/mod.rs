//! Secret entry lifecycle
//!
//! - `SecretStore`: upsert, lookup and delete bound to one access group
//! - Identity to query composition
//! - A once-only process-wide shared store

mod identity;
mod error;
mod store;
pub mod shared;

pub use identity::{build_query, lookup_query, write_query, IdentityKey};
pub use error::{StoreError, StoreOutcome, StoreResult};
pub use store::SecretStore;
