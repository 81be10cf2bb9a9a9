use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use idsrv_auth::storage::RefreshTokenStorage;
use idsrv_auth::types::RefreshToken;
use idsrv_auth::{AuthError, AuthResult};

/// Refresh token store held in memory, keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: DashMap<String, RefreshToken>,
}

impl InMemoryRefreshTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Removes every token issued to `client_id`. Returns the number removed.
    pub fn revoke_by_client(&self, client_id: &str) -> u64 {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| token.client_id != client_id);
        before.saturating_sub(self.tokens.len()) as u64
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        match self.tokens.entry(token.token_hash.clone()) {
            Entry::Occupied(_) => {
                Err(AuthError::storage("Refresh token hash already exists"))
            }
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
                Ok(())
            }
        }
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.get(token_hash).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, token_hash: &str) -> AuthResult<bool> {
        Ok(self.tokens.remove(token_hash).is_some())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired());
        let removed = before.saturating_sub(self.tokens.len()) as u64;
        tracing::debug!(removed, "Cleaned up expired refresh tokens");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idsrv_auth::types::{Client, GrantType, Subject, TokenUsage};
    use time::{Duration, OffsetDateTime};

    fn client(id: &str) -> Client {
        Client {
            client_id: id.to_string(),
            name: id.to_string(),
            enabled: true,
            confidential: false,
            client_secrets: vec![],
            grant_types: vec![GrantType::Password, GrantType::RefreshToken],
            redirect_uris: vec![],
            allowed_scopes: vec![],
            authorization_code_lifetime: None,
            access_token_lifetime: None,
            identity_token_lifetime: None,
            absolute_refresh_token_lifetime: None,
            sliding_refresh_token_lifetime: None,
            refresh_token_usage: TokenUsage::OneTimeOnly,
            refresh_token_expiration: Default::default(),
            access_token_type: Default::default(),
        }
    }

    fn issue(client_id: &str) -> (String, RefreshToken) {
        RefreshToken::issue(
            &client(client_id),
            Some(Subject::new("bob")),
            vec!["read".to_string()],
        )
    }

    #[tokio::test]
    async fn test_create_and_find_by_hash() {
        let storage = InMemoryRefreshTokenStorage::new();
        let (handle, token) = issue("roclient");
        storage.create(&token).await.unwrap();

        let found = storage
            .find_by_hash(&RefreshToken::hash_token(&handle))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, token.id);
        // raw handle is never a key
        assert!(storage.find_by_hash(&handle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_reports_presence() {
        let storage = InMemoryRefreshTokenStorage::new();
        let (_, token) = issue("roclient");
        storage.create(&token).await.unwrap();

        assert!(storage.remove(&token.token_hash).await.unwrap());
        assert!(!storage.remove(&token.token_hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let storage = InMemoryRefreshTokenStorage::new();
        let (_, live) = issue("roclient");
        let (_, mut expired) = issue("roclient");
        expired.expires_at = Some(OffsetDateTime::now_utc() - Duration::hours(1));
        let (_, mut forever) = issue("roclient");
        forever.expires_at = None;

        for token in [&live, &expired, &forever] {
            storage.create(token).await.unwrap();
        }

        assert_eq!(storage.cleanup_expired().await.unwrap(), 1);
        assert_eq!(storage.len(), 2);
        assert!(storage.find_by_hash(&expired.token_hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_by_client() {
        let storage = InMemoryRefreshTokenStorage::new();
        storage.create(&issue("a").1).await.unwrap();
        storage.create(&issue("a").1).await.unwrap();
        storage.create(&issue("b").1).await.unwrap();

        assert_eq!(storage.revoke_by_client("a"), 2);
        assert_eq!(storage.len(), 1);
    }
}
