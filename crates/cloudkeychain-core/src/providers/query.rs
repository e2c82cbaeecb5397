//! Query vocabulary understood by every provider

/// Class of item a query addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemClass {
    /// A generic named secret (`kSecClassGenericPassword`)
    #[default]
    GenericPassword,
}

/// How many matches a lookup may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchLimit {
    #[default]
    One,
    All,
}

/// Attribute set passed to provider primitives
///
/// `service` is `None` when the caller wants to match any service name for
/// the account. Providers compare every attribute byte-exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub class: ItemClass,
    pub account: String,
    pub service: Option<String>,
    pub access_group: String,
    pub synchronizable: bool,
    /// Ask `find` to hand back the stored payload
    pub return_data: bool,
    pub match_limit: MatchLimit,
}

impl Query {
    /// A generic-password query for `account` inside `access_group`
    pub fn new(account: impl Into<String>, access_group: impl Into<String>) -> Self {
        Self {
            class: ItemClass::GenericPassword,
            account: account.into(),
            service: None,
            access_group: access_group.into(),
            synchronizable: false,
            return_data: false,
            match_limit: MatchLimit::One,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn synchronizable(mut self, synchronizable: bool) -> Self {
        self.synchronizable = synchronizable;
        self
    }

    pub fn returning_data(mut self) -> Self {
        self.return_data = true;
        self
    }

    pub fn with_match_limit(mut self, limit: MatchLimit) -> Self {
        self.match_limit = limit;
        self
    }

    /// Service name an inserted item is stored under
    pub fn stored_service(&self) -> &str {
        self.service.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = Query::new("alice", "TEAM.com.example.shared");
        assert_eq!(query.class, ItemClass::GenericPassword);
        assert_eq!(query.service, None);
        assert!(!query.synchronizable);
        assert!(!query.return_data);
        assert_eq!(query.match_limit, MatchLimit::One);
        assert_eq!(query.stored_service(), "");
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new("alice", "group")
            .with_service("openai")
            .synchronizable(true)
            .returning_data()
            .with_match_limit(MatchLimit::All);
        assert_eq!(query.stored_service(), "openai");
        assert!(query.synchronizable);
        assert!(query.return_data);
        assert_eq!(query.match_limit, MatchLimit::All);
    }
}
