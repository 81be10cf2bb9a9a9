use async_trait::async_trait;
use dashmap::DashMap;
use idsrv_auth::secret::{hash_secret, verify_secret};
use idsrv_auth::storage::{AuthenticateResult, UserCredentialValidator};
use idsrv_auth::types::{Client, Subject};
use idsrv_auth::{AuthError, AuthResult};

#[derive(Debug, Clone)]
struct LocalUser {
    password_hash: String,
    subject: Subject,
    enabled: bool,
}

/// Local user accounts for the resource owner password grant.
///
/// Passwords are stored as Argon2id PHC strings.
#[derive(Debug, Default)]
pub struct InMemoryUserCredentials {
    users: DashMap<String, LocalUser>,
}

impl InMemoryUserCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user, hashing `password`.
    pub fn add_user(&self, username: &str, password: &str, subject: Subject) -> AuthResult<()> {
        let password_hash = hash_secret(password)
            .map_err(|e| AuthError::internal(format!("Failed to hash password: {e}")))?;
        self.users.insert(
            username.to_string(),
            LocalUser {
                password_hash,
                subject,
                enabled: true,
            },
        );
        Ok(())
    }

    /// Enables or disables a user. Returns `false` if the user is unknown.
    pub fn set_enabled(&self, username: &str, enabled: bool) -> bool {
        match self.users.get_mut(username) {
            Some(mut user) => {
                user.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserCredentialValidator for InMemoryUserCredentials {
    async fn authenticate_local(
        &self,
        username: &str,
        password: &str,
        client: &Client,
    ) -> AuthResult<AuthenticateResult> {
        let Some(user) = self.users.get(username).map(|entry| entry.value().clone()) else {
            tracing::debug!(client_id = %client.client_id, "Unknown local user");
            return Ok(AuthenticateResult::failure());
        };

        let matches = verify_secret(password, &user.password_hash)
            .map_err(|e| AuthError::internal(format!("Stored password hash is malformed: {e}")))?;
        if !matches {
            return Ok(AuthenticateResult::failure());
        }

        if !user.enabled {
            return Ok(AuthenticateResult::failure_with("User account is disabled"));
        }

        Ok(AuthenticateResult::Success(user.subject))
    }
}
