//! In-memory storage backend for idsrv-auth.
//!
//! Every store is backed by a [`dashmap::DashMap`], so grant artifacts are
//! consumed with a single sharded remove and concurrent redemptions of the
//! same code or one-time refresh token cannot both succeed.
//!
//! Intended for tests, demos and single-node deployments. Nothing survives a
//! process restart.

mod authorization_code;
mod client;
mod refresh_token;
mod scope;
mod users;

pub use authorization_code::InMemoryAuthorizationCodeStorage;
pub use client::InMemoryClientStorage;
pub use refresh_token::InMemoryRefreshTokenStorage;
pub use scope::InMemoryScopeCatalog;
pub use users::InMemoryUserCredentials;
