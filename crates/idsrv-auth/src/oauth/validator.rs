//! Token request validation.
//!
//! [`TokenRequestValidator::validate`] runs a fixed pipeline over an
//! already-authenticated client:
//!
//! 1. Resolve `grant_type` (built-in or registered extension)
//! 2. Check the client may use it
//! 3. Run the grant routine
//! 4. Clamp granted scopes to the request and the client's entitlement
//!
//! Protocol failures come back as `Ok(ValidationResult::Invalid(..))`.
//! Store and collaborator failures, including timeouts, come back as `Err`
//! and never as a protocol error.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::AuthResult;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::client_auth::AuthenticatedClient;
use crate::oauth::custom::CustomGrantRegistry;
use crate::oauth::scope::{entitled_scopes, excess_scopes, filter_entitled, resolve_scopes};
use crate::oauth::token::{TokenError, TokenRequestParameters, params};
use crate::oauth::validated::{GrantArtifact, ValidatedTokenRequest, ValidationResult};
use crate::storage::{
    AuthenticateResult, AuthorizationCodeStorage, RefreshTokenStorage, ScopeCatalog,
    UserCredentialValidator,
};
use crate::types::{Client, GrantType, RefreshToken, Scope};

/// Validates token endpoint requests.
///
/// Holds only shared handles to its collaborators; one instance serves any
/// number of concurrent requests.
#[derive(Clone)]
pub struct TokenRequestValidator {
    config: OAuthConfig,
    codes: Arc<dyn AuthorizationCodeStorage>,
    refresh_tokens: Arc<dyn RefreshTokenStorage>,
    scopes: Arc<dyn ScopeCatalog>,
    users: Option<Arc<dyn UserCredentialValidator>>,
    custom_grants: CustomGrantRegistry,
}

impl TokenRequestValidator {
    /// Creates a validator without a user credential validator or
    /// extension grants.
    #[must_use]
    pub fn new(
        config: OAuthConfig,
        codes: Arc<dyn AuthorizationCodeStorage>,
        refresh_tokens: Arc<dyn RefreshTokenStorage>,
        scopes: Arc<dyn ScopeCatalog>,
    ) -> Self {
        Self {
            config,
            codes,
            refresh_tokens,
            scopes,
            users: None,
            custom_grants: CustomGrantRegistry::new(),
        }
    }

    /// Enables the password grant.
    #[must_use]
    pub fn with_user_validator(mut self, users: Arc<dyn UserCredentialValidator>) -> Self {
        self.users = Some(users);
        self
    }

    /// Installs the extension grant registry.
    #[must_use]
    pub fn with_custom_grants(mut self, custom_grants: CustomGrantRegistry) -> Self {
        self.custom_grants = custom_grants;
        self
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Validates a token request.
    ///
    /// `client` is the result of client authentication, or `None` when the
    /// host could not identify a client.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure failures: a store or
    /// collaborator failed or did not answer within `store_timeout`.
    pub async fn validate(
        &self,
        request: &TokenRequestParameters,
        client: Option<&AuthenticatedClient>,
    ) -> AuthResult<ValidationResult> {
        let grant_type = request.get(params::GRANT_TYPE).unwrap_or_default();
        let client_id = client.map(|c| c.client.client_id.as_str()).unwrap_or_default();

        let outcome = match self.run(request, client).await {
            Ok(outcome) => outcome,
            Err(err) => match TokenError::try_from(err) {
                Ok(protocol) => ValidationResult::Invalid(protocol),
                Err(fatal) => {
                    error!(
                        grant_type = %grant_type,
                        client_id = %client_id,
                        error = %fatal,
                        category = %fatal.category(),
                        "Token request validation failed"
                    );
                    return Err(fatal);
                }
            },
        };

        match &outcome {
            ValidationResult::Valid(validated) => info!(
                grant_type = %grant_type,
                client_id = %client_id,
                scope = %validated.scope_string(),
                "Token request validated"
            ),
            ValidationResult::Invalid(e) => warn!(
                grant_type = %grant_type,
                client_id = %client_id,
                error = %e.error,
                error_description = %e.description(),
                "Token request rejected"
            ),
        }

        Ok(outcome)
    }

    async fn run(
        &self,
        request: &TokenRequestParameters,
        client: Option<&AuthenticatedClient>,
    ) -> AuthResult<ValidationResult> {
        let grant_type = self.resolve_grant_type(request)?;
        let client = self.check_client(&grant_type, client)?;

        let validated = match &grant_type {
            GrantType::AuthorizationCode => self.authorization_code(request, client).await?,
            GrantType::ClientCredentials => self.client_credentials(request, client).await?,
            GrantType::Password => self.password(request, client).await?,
            GrantType::RefreshToken => self.refresh_token(request, client).await?,
            GrantType::Custom(name) => match self.custom(name, request, client).await? {
                ValidationResult::Valid(validated) => *validated,
                invalid @ ValidationResult::Invalid(_) => return Ok(invalid),
            },
        };

        let validated = clamp_scopes(request, validated)?;
        Ok(ValidationResult::valid(validated))
    }

    fn resolve_grant_type(&self, request: &TokenRequestParameters) -> AuthResult<GrantType> {
        let raw = request
            .get(params::GRANT_TYPE)
            .ok_or_else(|| AuthError::unsupported_grant_type(""))?;

        let grant_type = GrantType::parse(raw);
        let available = match &grant_type {
            GrantType::Custom(name) => self.custom_grants.contains(name),
            GrantType::Password => {
                self.users.is_some() && self.config.is_grant_enabled(&grant_type)
            }
            builtin => self.config.is_grant_enabled(builtin),
        };

        if !available {
            return Err(AuthError::unsupported_grant_type(raw));
        }
        Ok(grant_type)
    }

    fn check_client<'a>(
        &self,
        grant_type: &GrantType,
        client: Option<&'a AuthenticatedClient>,
    ) -> AuthResult<&'a Client> {
        let authenticated =
            client.ok_or_else(|| AuthError::invalid_client("Client authentication required"))?;
        let client = &authenticated.client;

        if !client.enabled {
            return Err(AuthError::invalid_client("Client is disabled"));
        }

        if client.confidential && !authenticated.is_authenticated() {
            return Err(AuthError::invalid_client(
                "Confidential clients must authenticate",
            ));
        }

        if grant_type.requires_confidential_client() && !client.confidential {
            return Err(AuthError::invalid_client(format!(
                "Public clients cannot use the {} grant",
                grant_type
            )));
        }

        if !client.is_grant_type_allowed(grant_type) {
            return Err(AuthError::unauthorized_client(format!(
                "Client is not allowed to use the {} grant",
                grant_type
            )));
        }

        Ok(client)
    }

    // =========================================================================
    // Grant routines
    // =========================================================================

    async fn authorization_code(
        &self,
        request: &TokenRequestParameters,
        client: &Client,
    ) -> AuthResult<ValidatedTokenRequest> {
        let code = require(request, params::CODE)?;
        let redirect_uri = require(request, params::REDIRECT_URI)?;

        // Consumed before any other check: a code presented once is gone.
        let stored = self
            .timed("authorization_code.try_consume", self.codes.try_consume(code))
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Invalid authorization code"))?;

        let lifetime = client.authorization_code_lifetime_or(self.config.authorization_code_ttl());
        if stored.is_expired(lifetime) {
            return Err(AuthError::invalid_grant("Authorization code expired"));
        }

        if stored.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to another client",
            ));
        }

        if stored.redirect_uri != redirect_uri {
            return Err(AuthError::invalid_grant("Redirect URI does not match"));
        }

        let names = narrow(request.scopes(), &stored.scopes)?;
        let scopes = self.resolve_entitled(client, &names).await?;

        debug!(client_id = %client.client_id, "Authorization code redeemed");

        Ok(ValidatedTokenRequest::new(
            GrantType::AuthorizationCode,
            client.clone(),
            request.clone(),
        )
        .with_subject(stored.subject.clone())
        .with_scopes(scopes)
        .with_artifact(GrantArtifact::AuthorizationCode(stored)))
    }

    async fn client_credentials(
        &self,
        request: &TokenRequestParameters,
        client: &Client,
    ) -> AuthResult<ValidatedTokenRequest> {
        let requested = request.scopes();

        let scopes = if requested.is_empty() {
            self.timed("scope.all_scopes", entitled_scopes(self.scopes.as_ref(), client))
                .await?
                .into_iter()
                .filter(Scope::is_resource)
                .collect()
        } else {
            let resolved = self
                .timed("scope.find_scopes", resolve_scopes(self.scopes.as_ref(), &requested))
                .await?;
            if let Some(identity) = resolved.iter().find(|s| s.is_identity()) {
                return Err(AuthError::invalid_scope(format!(
                    "Identity scope '{}' cannot be requested with client_credentials",
                    identity.name
                )));
            }
            filter_entitled(client, resolved)
        };

        Ok(ValidatedTokenRequest::new(
            GrantType::ClientCredentials,
            client.clone(),
            request.clone(),
        )
        .with_scopes(scopes))
    }

    async fn password(
        &self,
        request: &TokenRequestParameters,
        client: &Client,
    ) -> AuthResult<ValidatedTokenRequest> {
        let username = require(request, params::USERNAME)?;
        let password = require(request, params::PASSWORD)?;

        let users = self
            .users
            .as_ref()
            .ok_or_else(|| AuthError::unsupported_grant_type(GrantType::Password.as_str()))?;

        let subject = match self
            .timed(
                "user.authenticate_local",
                users.authenticate_local(username, password, client),
            )
            .await?
        {
            AuthenticateResult::Success(subject) => subject,
            AuthenticateResult::Failure { message } => {
                return Err(AuthError::invalid_grant(
                    message.unwrap_or_else(|| "Invalid username or password".to_string()),
                ));
            }
        };

        let requested = request.scopes();
        let scopes = if requested.is_empty() {
            self.timed("scope.all_scopes", entitled_scopes(self.scopes.as_ref(), client))
                .await?
        } else {
            self.resolve_entitled(client, &requested).await?
        };

        Ok(
            ValidatedTokenRequest::new(GrantType::Password, client.clone(), request.clone())
                .with_subject(subject)
                .with_scopes(scopes),
        )
    }

    async fn refresh_token(
        &self,
        request: &TokenRequestParameters,
        client: &Client,
    ) -> AuthResult<ValidatedTokenRequest> {
        let handle = require(request, params::REFRESH_TOKEN)?;
        let token_hash = RefreshToken::hash_token(handle);

        let token = self
            .timed(
                "refresh_token.find_by_hash",
                self.refresh_tokens.find_by_hash(&token_hash),
            )
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Invalid refresh token"))?;

        if token.is_expired() {
            self.timed("refresh_token.remove", self.refresh_tokens.remove(&token_hash))
                .await?;
            return Err(AuthError::invalid_grant("Refresh token expired"));
        }

        if token.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Refresh token was issued to another client",
            ));
        }

        let names = narrow(request.scopes(), &token.scopes)?;
        let scopes = self.resolve_entitled(client, &names).await?;

        let rotate = token.is_one_time_only();
        if rotate {
            let removed = self
                .timed("refresh_token.remove", self.refresh_tokens.remove(&token_hash))
                .await?;
            if !removed {
                return Err(AuthError::invalid_grant("Refresh token already used"));
            }
        }

        let mut validated =
            ValidatedTokenRequest::new(GrantType::RefreshToken, client.clone(), request.clone())
                .with_scopes(scopes);
        validated.subject = token.subject.clone();
        Ok(validated.with_artifact(GrantArtifact::RefreshToken { token, rotate }))
    }

    async fn custom(
        &self,
        name: &str,
        request: &TokenRequestParameters,
        client: &Client,
    ) -> AuthResult<ValidationResult> {
        let validator = self
            .custom_grants
            .get(name)
            .ok_or_else(|| AuthError::unsupported_grant_type(name))?;

        let mut result = self
            .timed("custom_grant.validate", validator.validate(request, client))
            .await?;

        // The outcome always belongs to the authenticated client and the
        // dispatched grant, whatever the extension put there.
        if let ValidationResult::Valid(validated) = &mut result {
            validated.client = client.clone();
            validated.grant_type = GrantType::Custom(name.to_string());
            let scopes = std::mem::take(&mut validated.scopes);
            validated.scopes = filter_entitled(client, scopes);
        }
        Ok(result)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn resolve_entitled(&self, client: &Client, names: &[String]) -> AuthResult<Vec<Scope>> {
        let resolved = self
            .timed("scope.find_scopes", resolve_scopes(self.scopes.as_ref(), names))
            .await?;
        Ok(filter_entitled(client, resolved))
    }

    /// Bounds a collaborator call by `store_timeout`.
    ///
    /// Any error the collaborator returns is reported as a storage failure,
    /// so a broken store cannot masquerade as a protocol decision.
    async fn timed<T, F>(&self, operation: &'static str, call: F) -> AuthResult<T>
    where
        F: Future<Output = AuthResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) if err.is_client_error() => Err(AuthError::storage(format!(
                "{} returned a protocol error: {}",
                operation, err
            ))),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(AuthError::timeout(operation)),
        }
    }
}

impl std::fmt::Debug for TokenRequestValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequestValidator")
            .field("config", &self.config)
            .field("password_grant", &self.users.is_some())
            .field("custom_grants", &self.custom_grants)
            .finish_non_exhaustive()
    }
}

fn require<'a>(request: &'a TokenRequestParameters, name: &str) -> AuthResult<&'a str> {
    request
        .get(name)
        .ok_or_else(|| AuthError::invalid_request(format!("Missing {} parameter", name)))
}

/// Narrows an originally granted scope set by the requested names.
///
/// No request keeps the original set; a request naming anything outside it
/// is `invalid_scope`.
fn narrow(requested: Vec<String>, original: &[String]) -> AuthResult<Vec<String>> {
    if requested.is_empty() {
        return Ok(original.to_vec());
    }

    let excess = excess_scopes(&requested, original);
    if !excess.is_empty() {
        return Err(AuthError::invalid_scope(format!(
            "Requested scope exceeds original grant: {}",
            excess.join(" ")
        )));
    }
    Ok(requested)
}

/// Final scope check shared by every grant.
///
/// Granted scopes never include anything outside the client's entitlement,
/// nor, when a scope was requested, anything outside the request.
fn clamp_scopes(
    request: &TokenRequestParameters,
    mut validated: ValidatedTokenRequest,
) -> AuthResult<ValidatedTokenRequest> {
    let requested = request.scopes();
    let client = &validated.client;

    validated.scopes.retain(|scope| {
        client.is_scope_allowed(&scope.name)
            && (requested.is_empty() || requested.contains(&scope.name))
    });

    if !requested.is_empty() && validated.scopes.is_empty() {
        return Err(AuthError::invalid_scope(
            "None of the requested scopes are allowed for this client",
        ));
    }
    Ok(validated)
}
