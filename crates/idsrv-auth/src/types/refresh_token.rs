//! Refresh token domain type.
//!
//! # Security
//!
//! - Refresh tokens are stored as SHA-256 hashes, never plaintext
//! - One-time-only tokens are removed from the store on redemption

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::client::{Client, TokenUsage};
use super::subject::Subject;

/// Refresh token record.
///
/// The handle returned to the client is never stored. Lookups hash the
/// presented handle and search by `token_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique identifier for this refresh token record.
    pub id: Uuid,

    /// SHA-256 hash of the handle.
    pub token_hash: String,

    /// Client ID that this token was issued to.
    pub client_id: String,

    /// Resource owner (None for tokens issued without a user).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Scope names granted when the token was originally issued.
    pub scopes: Vec<String>,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When this token expires (None = no expiration).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,

    /// Usage policy captured from the client at issuance.
    #[serde(default)]
    pub usage: TokenUsage,
}

impl RefreshToken {
    /// Creates a new token record for `client` and returns it together with
    /// the plaintext handle.
    ///
    /// Expiration uses the client's absolute refresh token lifetime. A
    /// lifetime past the representable date range yields no expiration.
    #[must_use]
    pub fn issue(client: &Client, subject: Option<Subject>, scopes: Vec<String>) -> (String, Self) {
        let handle = Self::generate_token();
        let now = OffsetDateTime::now_utc();
        let token = Self {
            id: Uuid::new_v4(),
            token_hash: Self::hash_token(&handle),
            client_id: client.client_id.clone(),
            subject,
            scopes,
            created_at: now,
            expires_at: now.checked_add(Duration::seconds(
                client.absolute_refresh_token_lifetime_secs(),
            )),
            usage: client.refresh_token_usage,
        };
        (handle, token)
    }

    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| OffsetDateTime::now_utc() > exp)
            .unwrap_or(false)
    }

    /// Returns `true` if the token is removed on redemption.
    #[must_use]
    pub fn is_one_time_only(&self) -> bool {
        self.usage == TokenUsage::OneTimeOnly
    }

    /// Hash a token value using SHA-256.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Generate a cryptographically secure random token.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_token() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
