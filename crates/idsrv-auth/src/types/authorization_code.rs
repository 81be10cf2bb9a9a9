//! Authorization code domain type.
//!
//! Codes are single-use. The handle is an opaque random string; everything
//! the token endpoint needs to finish the flow is captured here when the
//! authorize endpoint issues the code.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use super::subject::Subject;

/// A stored authorization code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    /// The opaque code handle presented by the client.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Resource owner who approved the request.
    pub subject: Subject,

    /// Scope names granted at the authorize endpoint.
    pub scopes: Vec<String>,

    /// Redirect URI used at the authorize endpoint.
    pub redirect_uri: String,

    /// Whether the original request included the `openid` scope.
    #[serde(default)]
    pub is_open_id: bool,

    #[serde(default)]
    pub was_identity_token_requested: bool,

    #[serde(default)]
    pub was_access_token_requested: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Generates a new random code handle.
    ///
    /// Returns a 256-bit random value encoded as base64url (43 characters).
    #[must_use]
    pub fn generate_code() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// When the code stops being redeemable under the given lifetime.
    ///
    /// `None` when `created_at + lifetime` is outside the representable
    /// date range.
    #[must_use]
    pub fn expires_at(&self, lifetime: Duration) -> Option<OffsetDateTime> {
        self.created_at.checked_add(lifetime)
    }

    /// Returns `true` if `created_at + lifetime` is in the past.
    ///
    /// A lifetime too large to represent never expires.
    #[must_use]
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.expires_at(lifetime)
            .is_some_and(|expires_at| OffsetDateTime::now_utc() > expires_at)
    }
}
