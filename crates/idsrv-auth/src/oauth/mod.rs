//! OAuth 2.0 token endpoint validation.
//!
//! The host authenticates the client with [`client_auth`], hands the request
//! to [`TokenRequestValidator`], and serializes the [`ValidationResult`].

pub mod client_auth;
pub mod custom;
pub mod scope;
pub mod token;
pub mod validated;
pub mod validator;

pub use client_auth::{
    AuthenticatedClient, TokenEndpointAuthMethod, authenticate_client, parse_basic_auth,
};
pub use custom::{CustomGrantRegistry, CustomGrantValidator};
pub use scope::resolve_scopes;
pub use token::{TokenError, TokenErrorCode, TokenRequestParameters, TokenResponse, parse_scope};
pub use validated::{GrantArtifact, ValidatedTokenRequest, ValidationResult};
pub use validator::TokenRequestValidator;
