//! # idsrv-auth
//!
//! Token request validation for an OpenID Connect / OAuth 2.0 provider.
//!
//! This crate provides:
//! - Client authentication at the token endpoint
//! - Validation of the authorization_code, client_credentials, password and
//!   refresh_token grants, plus registered extension grants
//! - Scope resolution and down-scoping against client entitlement
//! - Store contracts with atomic consume semantics for grant artifacts
//!
//! Token minting is out of scope; hosts plug it in through
//! [`http::TokenIssuer`].
//!
//! ## Modules
//!
//! - [`config`] - Token endpoint configuration
//! - [`oauth`] - Client authentication, the validator, and wire types
//! - [`storage`] - Storage traits for clients, artifacts, scopes and users
//! - [`types`] - Domain types
//! - [`http`] - Axum handler for the token endpoint
//! - [`secret`] - Client secret generation and hashing

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod secret;
pub mod storage;
pub mod types;

pub use config::{AuthConfig, ConfigError, OAuthConfig};
pub use error::{AuthError, ErrorCategory};
pub use http::{TokenIssuer, TokenState, token_handler};
pub use oauth::{
    AuthenticatedClient, CustomGrantRegistry, CustomGrantValidator, GrantArtifact, TokenError,
    TokenErrorCode, TokenRequestParameters, TokenRequestValidator, TokenResponse,
    ValidatedTokenRequest, ValidationResult,
};
pub use storage::{
    AuthenticateResult, AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage,
    ScopeCatalog, UserCredentialValidator,
};
pub use types::{
    AuthorizationCode, Client, ClientValidationError, GrantType, RefreshToken, Scope, Subject,
};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use idsrv_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, OAuthConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{TokenIssuer, TokenState, token_handler};
    pub use crate::oauth::{
        AuthenticatedClient, CustomGrantRegistry, CustomGrantValidator, GrantArtifact,
        TokenEndpointAuthMethod, TokenError, TokenErrorCode, TokenRequestParameters,
        TokenRequestValidator, TokenResponse, ValidatedTokenRequest, ValidationResult,
        authenticate_client,
    };
    pub use crate::storage::{
        AuthenticateResult, AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage,
        ScopeCatalog, UserCredentialValidator,
    };
    pub use crate::types::{
        AuthorizationCode, Client, ClientSecret, GrantType, RefreshToken, Scope, ScopeType,
        StandardScopes, Subject, TokenUsage,
    };
}
