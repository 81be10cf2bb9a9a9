use async_trait::async_trait;
use dashmap::DashMap;
use idsrv_auth::AuthResult;
use idsrv_auth::storage::ClientStorage;
use idsrv_auth::types::{Client, ClientValidationError};

/// Client registry held in memory.
///
/// Registrations are validated on insert, so lookups only ever return
/// well-formed clients.
#[derive(Debug, Default)]
pub struct InMemoryClientStorage {
    clients: DashMap<String, Client>,
}

impl InMemoryClientStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a client.
    pub fn insert(&self, client: Client) -> Result<(), ClientValidationError> {
        client.validate()?;
        tracing::debug!(client_id = %client.client_id, "Registered client");
        self.clients.insert(client.client_id.clone(), client);
        Ok(())
    }

    /// Removes a client registration. Returns `true` if it existed.
    pub fn remove(&self, client_id: &str) -> bool {
        self.clients.remove(client_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(client_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idsrv_auth::types::{ClientSecret, GrantType, TokenUsage};

    fn client(id: &str, confidential: bool) -> Client {
        Client {
            client_id: id.to_string(),
            name: id.to_string(),
            enabled: true,
            confidential,
            client_secrets: vec![],
            grant_types: vec![GrantType::Password],
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

    #[tokio::test]
    async fn test_insert_and_find() {
        let storage = InMemoryClientStorage::new();
        storage.insert(client("public", false)).unwrap();

        let found = storage.find_by_client_id("public").await.unwrap();
        assert_eq!(found.unwrap().client_id, "public");
        assert!(storage.find_by_client_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_registration() {
        let storage = InMemoryClientStorage::new();

        let err = storage.insert(client("secretless", true)).unwrap_err();
        assert!(matches!(err, ClientValidationError::MissingSecret));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_insert_replaces_existing() {
        let storage = InMemoryClientStorage::new();
        storage.insert(client("app", false)).unwrap();

        let mut confidential = client("app", true);
        confidential.client_secrets = vec![ClientSecret::from_plaintext("s3cret").unwrap()];
        storage.insert(confidential).unwrap();

        assert_eq!(storage.len(), 1);
        let found = storage.find_by_client_id("app").await.unwrap().unwrap();
        assert!(found.confidential);
    }

    #[test]
    fn test_remove() {
        let storage = InMemoryClientStorage::new();
        storage.insert(client("app", false)).unwrap();

        assert!(storage.remove("app"));
        assert!(!storage.remove("app"));
    }
}
