//! Storage traits for token request validation.
//!
//! This module defines storage interfaces for:
//!
//! - OAuth client registrations
//! - Authorization codes
//! - Refresh tokens
//! - The scope catalog
//! - Local resource-owner credentials
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `idsrv-auth-memory` - in-process backend for tests and single-node hosts

pub mod authorization_code;
pub mod client;
pub mod credentials;
pub mod refresh_token;
pub mod scope;

pub use authorization_code::AuthorizationCodeStorage;
pub use client::ClientStorage;
pub use credentials::{AuthenticateResult, UserCredentialValidator};
pub use refresh_token::RefreshTokenStorage;
pub use scope::ScopeCatalog;
