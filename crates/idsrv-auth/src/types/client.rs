//! OAuth 2.0 Client domain types.
//!
//! This module defines the `Client` registration and the policy enums that
//! travel with it (grant types, refresh token usage and expiration, access
//! token type).

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::error::AuthError;
use crate::secret;

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// The built-in grants are enumerated. Any other `grant_type` value parses
/// into `Custom` and is routed to the custom grant registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GrantType {
    /// Authorization Code flow.
    AuthorizationCode,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Resource Owner Password Credentials flow.
    Password,
    /// Refresh Token flow.
    RefreshToken,
    /// Extension grant identified by its `grant_type` value.
    Custom(String),
}

impl GrantType {
    /// Parses a `grant_type` parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "authorization_code" => Self::AuthorizationCode,
            "client_credentials" => Self::ClientCredentials,
            "password" => Self::Password,
            "refresh_token" => Self::RefreshToken,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::Password => "password",
            Self::RefreshToken => "refresh_token",
            Self::Custom(name) => name,
        }
    }

    /// Returns `true` for extension grants.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Returns `true` if only confidential clients may use this grant.
    #[must_use]
    pub fn requires_confidential_client(&self) -> bool {
        matches!(self, Self::ClientCredentials)
    }
}

impl FromStr for GrantType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for GrantType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<GrantType> for String {
    fn from(value: GrantType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Token policies
// =============================================================================

/// Whether a refresh token may be redeemed more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUsage {
    /// The token may be redeemed repeatedly until it expires.
    ReUse,
    /// The token is removed on redemption and a replacement must be issued.
    #[default]
    OneTimeOnly,
}

/// How refresh token expiration is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenExpiration {
    /// Fixed lifetime from the original issuance.
    #[default]
    Absolute,
    /// Lifetime extended on each use, capped by the absolute lifetime.
    Sliding,
}

/// Format of issued access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenType {
    /// Self-contained signed JWT.
    #[default]
    Jwt,
    /// Opaque handle resolved through the reference token store.
    Reference,
}

// =============================================================================
// Client Secret
// =============================================================================

/// A hashed client secret with optional expiration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecret {
    /// Argon2id PHC hash of the secret.
    pub value: String,

    /// Free-form description (e.g. which deployment uses it).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When this secret stops being accepted.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

impl ClientSecret {
    /// Hashes a plaintext secret into a new non-expiring `ClientSecret`.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn from_plaintext(plaintext: &str) -> AuthResult<Self> {
        let value = secret::hash_secret(plaintext)
            .map_err(|e| AuthError::internal(format!("Failed to hash client secret: {}", e)))?;
        Ok(Self {
            value,
            description: None,
            expires_at: None,
        })
    }

    /// Sets the expiration time.
    #[must_use]
    pub fn with_expiration(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns `true` if this secret has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| OffsetDateTime::now_utc() > exp)
            .unwrap_or(false)
    }
}

// =============================================================================
// Client
// =============================================================================

fn default_enabled() -> bool {
    true
}

/// Upper bound for any per-client lifetime (10 years).
pub const MAX_LIFETIME_SECS: i64 = 10 * 365 * 24 * 3600;

/// OAuth 2.0 client registration.
///
/// Loaded from the client registry once per request and never mutated by
/// the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Human-readable display name.
    pub name: String,

    /// Whether this client can currently be used.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Whether this is a confidential client (holds a secret).
    pub confidential: bool,

    /// Hashed secrets. Any non-expired entry authenticates the client.
    #[serde(default)]
    pub client_secrets: Vec<ClientSecret>,

    /// Grant types this client is allowed to use.
    pub grant_types: Vec<GrantType>,

    /// Registered redirect URIs, compared by exact string equality.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Scopes this client may be granted.
    /// Empty list means every scope in the catalog.
    #[serde(default)]
    pub allowed_scopes: Vec<String>,

    /// Authorization code lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_code_lifetime: Option<i64>,

    /// Access token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Identity token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_token_lifetime: Option<i64>,

    /// Maximum refresh token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_refresh_token_lifetime: Option<i64>,

    /// Sliding refresh token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sliding_refresh_token_lifetime: Option<i64>,

    /// Refresh token reuse policy.
    #[serde(default)]
    pub refresh_token_usage: TokenUsage,

    /// Refresh token expiration policy.
    #[serde(default)]
    pub refresh_token_expiration: TokenExpiration,

    /// Format of issued access tokens.
    #[serde(default)]
    pub access_token_type: AccessTokenType,
}

impl Client {
    /// Validates the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }

        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        if !self.confidential && self.grant_types.contains(&GrantType::ClientCredentials) {
            return Err(ClientValidationError::PublicClientCredentials);
        }

        if self.confidential && self.client_secrets.is_empty() {
            return Err(ClientValidationError::MissingSecret);
        }

        if self.grant_types.contains(&GrantType::AuthorizationCode) && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }

        let lifetimes = [
            ("authorization_code_lifetime", self.authorization_code_lifetime),
            ("access_token_lifetime", self.access_token_lifetime),
            ("identity_token_lifetime", self.identity_token_lifetime),
            ("absolute_refresh_token_lifetime", self.absolute_refresh_token_lifetime),
            ("sliding_refresh_token_lifetime", self.sliding_refresh_token_lifetime),
        ];
        for (field, seconds) in lifetimes {
            if let Some(seconds) = seconds.filter(|s| !(1..=MAX_LIFETIME_SECS).contains(s)) {
                return Err(ClientValidationError::InvalidLifetime { field, seconds });
            }
        }

        Ok(())
    }

    /// Checks if the given redirect URI is registered for this client.
    ///
    /// Exact literal comparison: no case folding, no trailing slash or query
    /// normalization.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks if the given scope is allowed for this client.
    ///
    /// An empty list means all scopes are allowed.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        self.allowed_scopes.is_empty() || self.allowed_scopes.iter().any(|s| s == scope)
    }

    /// Checks if the given grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: &GrantType) -> bool {
        self.grant_types.contains(grant_type)
    }

    /// Verifies a plaintext secret against the client's non-expired secrets.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a stored secret is not a valid hash.
    pub fn verify_secret(&self, plaintext: &str) -> AuthResult<bool> {
        for stored in self.client_secrets.iter().filter(|s| !s.is_expired()) {
            let matches = secret::verify_secret(plaintext, &stored.value).map_err(|e| {
                AuthError::configuration(format!(
                    "Client '{}' has a malformed secret hash: {}",
                    self.client_id, e
                ))
            })?;
            if matches {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns the authorization code lifetime, falling back to `default`.
    #[must_use]
    pub fn authorization_code_lifetime_or(&self, default: Duration) -> Duration {
        self.authorization_code_lifetime
            .map(Duration::seconds)
            .unwrap_or(default)
    }

    /// Returns the access token lifetime in seconds.
    ///
    /// Defaults to 3600 (1 hour) if not specified.
    #[must_use]
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_token_lifetime.unwrap_or(3600)
    }

    /// Returns the identity token lifetime in seconds.
    ///
    /// Defaults to 300 (5 minutes) if not specified.
    #[must_use]
    pub fn identity_token_lifetime_secs(&self) -> i64 {
        self.identity_token_lifetime.unwrap_or(300)
    }

    /// Returns the absolute refresh token lifetime in seconds.
    ///
    /// Defaults to 2592000 (30 days) if not specified.
    #[must_use]
    pub fn absolute_refresh_token_lifetime_secs(&self) -> i64 {
        self.absolute_refresh_token_lifetime.unwrap_or(2_592_000)
    }

    /// Returns the sliding refresh token lifetime in seconds.
    ///
    /// Defaults to 1296000 (15 days) if not specified.
    #[must_use]
    pub fn sliding_refresh_token_lifetime_secs(&self) -> i64 {
        self.sliding_refresh_token_lifetime.unwrap_or(1_296_000)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Errors that can occur during client validation.
#[derive(Debug, thiserror::Error)]
pub enum ClientValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// Client name cannot be empty.
    #[error("Client name cannot be empty")]
    EmptyName,

    /// At least one grant type is required.
    #[error("At least one grant type is required")]
    NoGrantTypes,

    /// Public clients cannot use client_credentials grant.
    #[error("Public clients cannot use client_credentials grant")]
    PublicClientCredentials,

    /// Authorization code flow requires redirect URIs.
    #[error("Authorization code flow requires redirect URIs")]
    NoRedirectUris,

    /// Confidential clients require a client secret.
    #[error("Confidential clients require a client secret")]
    MissingSecret,

    /// A lifetime is not positive or exceeds [`MAX_LIFETIME_SECS`].
    #[error("{field} must be between 1 and {max} seconds, got {seconds}", max = MAX_LIFETIME_SECS)]
    InvalidLifetime { field: &'static str, seconds: i64 },
}

// =============================================================================
// Tests
// =============================================================================
