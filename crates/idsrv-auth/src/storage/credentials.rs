//! Resource owner credential checking for the password grant.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{Client, Subject};

/// Outcome of a local credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticateResult {
    /// The credentials identify this subject.
    Success(Subject),
    /// The credentials were rejected.
    Failure {
        /// Optional reason surfaced as the error description.
        message: Option<String>,
    },
}

impl AuthenticateResult {
    #[must_use]
    pub fn failure() -> Self {
        Self::Failure { message: None }
    }

    #[must_use]
    pub fn failure_with(message: impl Into<String>) -> Self {
        Self::Failure {
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Verifies a username and password on behalf of a client.
#[async_trait]
pub trait UserCredentialValidator: Send + Sync {
    /// Checks the credentials.
    ///
    /// A wrong password is `Ok(AuthenticateResult::Failure { .. })`, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the user store cannot be reached.
    async fn authenticate_local(
        &self,
        username: &str,
        password: &str,
        client: &Client,
    ) -> AuthResult<AuthenticateResult>;
}
