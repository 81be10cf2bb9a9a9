//! Scope catalog trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Scope;

/// Read access to the configured scopes.
#[async_trait]
pub trait ScopeCatalog: Send + Sync {
    /// Returns the catalog entries for the given names.
    ///
    /// Unknown names are skipped. Order of the result is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_scopes(&self, names: &[String]) -> AuthResult<Vec<Scope>>;

    /// Returns every scope in the catalog, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn all_scopes(&self) -> AuthResult<Vec<Scope>>;
}
