//! Identity to provider query composition
//!
//! Inputs are passed through verbatim: no trimming, no case folding.

use crate::providers::{MatchLimit, Query};

/// Build a provider query for an entry identity
///
/// Every query is a generic-password query, bound to `scope` and flagged
/// synchronizable. `service_name` narrows the match when present.
pub fn build_query(account: &str, service_name: Option<&str>, scope: &str) -> Query {
    let query = Query::new(account, scope).synchronizable(true);
    match service_name {
        Some(service) => query.with_service(service),
        None => query,
    }
}

/// Query addressing exactly one entry, used to look up, insert, update and delete
pub fn write_query(account: &str, service_name: &str, scope: &str) -> Query {
    build_query(account, Some(service_name), scope)
}

/// Query returning the payload of one entry for `account`, any service name
pub fn lookup_query(account: &str, scope: &str) -> Query {
    build_query(account, None, scope)
        .returning_data()
        .with_match_limit(MatchLimit::One)
}

/// Key the in-process write lock is taken on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub scope: String,
    pub account: String,
    pub service: String,
}

impl IdentityKey {
    pub fn new(scope: &str, account: &str, service: &str) -> Self {
        Self {
            scope: scope.to_string(),
            account: account.to_string(),
            service: service.to_string(),
        }
    }
}
