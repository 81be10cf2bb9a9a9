use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use idsrv_auth::storage::AuthorizationCodeStorage;
use idsrv_auth::types::AuthorizationCode;
use idsrv_auth::{AuthError, AuthResult};
use time::Duration;

/// Authorization code store held in memory.
///
/// `try_consume` is a single `DashMap::remove`, which takes the shard write
/// lock. Of any number of concurrent redemptions only one receives the code.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationCodeStorage {
    codes: DashMap<String, AuthorizationCode>,
}

impl InMemoryAuthorizationCodeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Drops every code older than `lifetime`. Returns the number removed.
    pub fn sweep_expired(&self, lifetime: Duration) -> usize {
        let before = self.codes.len();
        self.codes.retain(|_, code| !code.is_expired(lifetime));
        let removed = before.saturating_sub(self.codes.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept expired authorization codes");
        }
        removed
    }
}

#[async_trait]
impl AuthorizationCodeStorage for InMemoryAuthorizationCodeStorage {
    async fn store(&self, code: &AuthorizationCode) -> AuthResult<()> {
        match self.codes.entry(code.code.clone()) {
            Entry::Occupied(_) => Err(AuthError::storage(
                "Authorization code handle already exists",
            )),
            Entry::Vacant(slot) => {
                slot.insert(code.clone());
                Ok(())
            }
        }
    }

    async fn find(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.get(code).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, code: &str) -> AuthResult<bool> {
        Ok(self.codes.remove(code).is_some())
    }

    async fn try_consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.remove(code).map(|(_, stored)| stored))
    }
}
