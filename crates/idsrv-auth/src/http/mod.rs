//! HTTP handlers for the token endpoint.
//!
//! # Available Handlers
//!
//! - [`token`] - Token endpoint (RFC 6749 Section 3.2)

pub mod token;

pub use token::{TokenIssuer, TokenState, token_handler};
