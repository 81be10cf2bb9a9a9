use async_trait::async_trait;
use dashmap::DashMap;
use idsrv_auth::AuthResult;
use idsrv_auth::storage::ScopeCatalog;
use idsrv_auth::types::{Scope, StandardScopes};

/// Scope catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryScopeCatalog {
    scopes: DashMap<String, Scope>,
}

impl InMemoryScopeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with `openid`, `profile`, `email` and `offline_access`.
    pub fn with_standard_scopes() -> Self {
        let catalog = Self::new();
        for scope in StandardScopes::all() {
            catalog.insert(scope);
        }
        catalog
    }

    /// Adds or replaces a scope definition.
    pub fn insert(&self, scope: Scope) {
        self.scopes.insert(scope.name.clone(), scope);
    }

    #[must_use]
    pub fn with_scope(self, scope: Scope) -> Self {
        self.insert(scope);
        self
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[async_trait]
impl ScopeCatalog for InMemoryScopeCatalog {
    /// Returns the known scopes among `names`, in request order. Unknown
    /// names are skipped.
    async fn find_scopes(&self, names: &[String]) -> AuthResult<Vec<Scope>> {
        Ok(names
            .iter()
            .filter_map(|name| self.scopes.get(name).map(|entry| entry.value().clone()))
            .collect())
    }

    /// Returns every scope sorted by name.
    async fn all_scopes(&self) -> AuthResult<Vec<Scope>> {
        let mut all: Vec<Scope> = self
            .scopes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}
