//! Core types for token request validation.
//!
//! This module contains the domain types the validator reads: clients,
//! scopes, subjects, and the grant artifacts held in stores.

pub mod authorization_code;
pub mod client;
pub mod refresh_token;
pub mod scope;
pub mod subject;

pub use authorization_code::AuthorizationCode;
pub use client::{
    AccessTokenType, Client, ClientSecret, ClientValidationError, GrantType, MAX_LIFETIME_SECS,
    TokenExpiration, TokenUsage,
};
pub use refresh_token::RefreshToken;
pub use scope::{Scope, ScopeClaim, ScopeType, StandardScopes};
pub use subject::{Claim, Subject};
