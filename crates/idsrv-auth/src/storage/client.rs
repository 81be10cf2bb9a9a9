//! Client storage trait.
//!
//! Defines the lookup the token endpoint performs before validation.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Read access to OAuth 2.0 client registrations.
///
/// # Example
///
/// ```ignore
/// use idsrv_auth::storage::ClientStorage;
///
/// async fn example(storage: &impl ClientStorage) {
///     if let Some(client) = storage.find_by_client_id("codeclient").await? {
///         println!("Found client: {}", client.name);
///     }
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Find a client by its OAuth client_id.
    ///
    /// Returns `None` if the client doesn't exist. Disabled clients are
    /// returned as-is; the caller decides what `enabled == false` means.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;
}
