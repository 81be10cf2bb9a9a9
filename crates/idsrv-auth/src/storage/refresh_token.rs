//! Refresh token storage trait.
//!
//! # Security Considerations
//!
//! - Tokens are stored as SHA-256 hashes only
//! - Removal must be atomic: of two concurrent removals of the same hash,
//!   exactly one observes `true`
//! - Expired tokens should be cleaned up periodically

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::RefreshToken;

/// Storage trait for refresh tokens.
///
/// # Example Implementation
///
/// ```ignore
/// use idsrv_auth::storage::RefreshTokenStorage;
/// use idsrv_auth::types::RefreshToken;
/// use idsrv_auth::AuthResult;
///
/// struct MapRefreshTokenStorage {
///     tokens: std::sync::RwLock<std::collections::HashMap<String, RefreshToken>>,
/// }
///
/// #[async_trait::async_trait]
/// impl RefreshTokenStorage for MapRefreshTokenStorage {
///     async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
///         let mut tokens = self.tokens.write().unwrap();
///         tokens.insert(token.token_hash.clone(), token.clone());
///         Ok(())
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores a new refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored (e.g., duplicate hash,
    /// storage unavailable).
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a refresh token by its hash.
    ///
    /// Returns tokens regardless of expiration; callers check
    /// `is_expired()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Removes a token by hash.
    ///
    /// Returns `true` only to the caller that actually removed the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn remove(&self, token_hash: &str) -> AuthResult<bool>;

    /// Deletes expired tokens and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
