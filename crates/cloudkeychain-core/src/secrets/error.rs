//! Store error types

use thiserror::Error;

use crate::providers::{Primitive, ProviderError};

/// How a successful upsert was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted,
    Updated,
}

/// Errors surfaced by the detailed (`try_*`) store API
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Stored payload is not valid UTF-8")]
    Decoding(#[from] std::string::FromUtf8Error),

    #[error("Provider returned no payload")]
    MissingPayload,

    #[error("Provider {operation} failed: {source}")]
    Provider {
        operation: Primitive,
        #[source]
        source: ProviderError,
    },
}

impl StoreError {
    pub fn provider(operation: Primitive, source: ProviderError) -> Self {
        Self::Provider { operation, source }
    }

    /// Provider status code, if the failure came from the provider
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Provider { source, .. } => Some(source.code()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Provider { source, .. } if source.is_not_found())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_details() {
        let err = StoreError::provider(Primitive::Remove, ProviderError::NotFound);
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), Some(-25300));
        assert!(err.to_string().starts_with("Provider remove failed"));
    }

    #[test]
    fn test_decoding_error() {
        let bad = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err = StoreError::from(bad);
        assert_eq!(err.status_code(), None);
        assert!(!err.is_not_found());
    }
}
