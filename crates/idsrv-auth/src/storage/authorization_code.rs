//! Authorization code storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage for issued authorization codes, keyed by handle.
///
/// # Atomicity
///
/// [`try_consume`](Self::try_consume) is the only operation the token
/// endpoint uses. It must hand a given code to at most one caller even under
/// concurrent redemption. A SQL backend implements it as a single statement:
///
/// ```sql
/// DELETE FROM authorization_codes WHERE code = $1 RETURNING *
/// ```
///
/// An implementation that does `find` followed by `remove` is not correct.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Stores a newly issued code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code cannot be stored.
    async fn store(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Looks up a code without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Removes a code. Returns `true` if this call removed it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn remove(&self, code: &str) -> AuthResult<bool>;

    /// Atomically looks up and removes a code.
    ///
    /// Returns `Some` to exactly one caller per stored code and `None` to
    /// everyone else, including callers presenting unknown handles.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn try_consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;
}
