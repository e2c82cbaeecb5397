//! Provider error types and status codes

use thiserror::Error;

/// Keychain-style `OSStatus` codes reported by secure-storage providers
pub mod status {
    pub const SUCCESS: i32 = 0;
    pub const PARAM: i32 = -50;
    pub const AUTH_FAILED: i32 = -25293;
    pub const DUPLICATE_ITEM: i32 = -25299;
    pub const ITEM_NOT_FOUND: i32 = -25300;
    pub const INTERACTION_NOT_ALLOWED: i32 = -25308;
    pub const INTERNAL: i32 = -26276;
}

/// Non-success outcome of a provider primitive
///
/// Only `NotFound` carries meaning for the store protocols. Everything else is
/// opaque and gets logged with its numeric code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No item matched the query
    #[error("item not found (status {})", status::ITEM_NOT_FOUND)]
    NotFound,

    /// An item with the same identity already exists
    #[error("duplicate item (status {})", status::DUPLICATE_ITEM)]
    Duplicate,

    /// Any other provider-defined status
    #[error("provider status {code}: {message}")]
    Status { code: i32, message: String },
}

impl ProviderError {
    /// Create an opaque status error
    pub fn status(code: i32, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Map a raw status code, recognising the two codes with dedicated variants
    pub fn from_code(code: i32) -> Self {
        match code {
            status::ITEM_NOT_FOUND => Self::NotFound,
            status::DUPLICATE_ITEM => Self::Duplicate,
            other => Self::status(other, "unrecognised status"),
        }
    }

    /// Numeric status code, suitable for postmortem logs
    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound => status::ITEM_NOT_FOUND,
            Self::Duplicate => status::DUPLICATE_ITEM,
            Self::Status { code, .. } => *code,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
