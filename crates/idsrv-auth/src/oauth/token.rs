//! Token endpoint wire types.
//!
//! This module provides the request parameter map, the success response
//! body, and the `{error, error_description}` error body of the OAuth 2.0
//! token endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Token endpoint form parameter names.
pub mod params {
    pub const GRANT_TYPE: &str = "grant_type";
    pub const CODE: &str = "code";
    pub const REDIRECT_URI: &str = "redirect_uri";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const SCOPE: &str = "scope";
    pub const CLIENT_ID: &str = "client_id";
    pub const CLIENT_SECRET: &str = "client_secret";
}

// =============================================================================
// Request parameters
// =============================================================================

/// Raw token request parameters.
///
/// Keeps every name/value pair in arrival order. Lookups return the first
/// occurrence of a name; later duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenRequestParameters {
    pairs: Vec<(String, String)>,
}

impl TokenRequestParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter set from decoded form pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Appends a pair.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Returns the first value for `name`, or `None` if absent or empty.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns `true` if a non-empty value for `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The requested scope names, de-duplicated in request order.
    ///
    /// Empty when the `scope` parameter is absent or blank.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        self.get(params::SCOPE).map(parse_scope).unwrap_or_default()
    }

    /// Iterates over all pairs, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Splits a space-delimited scope string, dropping duplicates.
#[must_use]
pub fn parse_scope(scope: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in scope.split_whitespace() {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

// =============================================================================
// Success response
// =============================================================================

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "scope": "openid api1",
///   "refresh_token": "abc123..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token (JWT or reference handle).
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// Refresh token (if offline_access scope was granted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (if openid scope was granted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response with required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
            refresh_token: None,
            id_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }

    /// Sets the ID token.
    #[must_use]
    pub fn with_id_token(mut self, token: String) -> Self {
        self.id_token = Some(token);
        self
    }
}

// =============================================================================
// Error response
// =============================================================================

/// Token error response.
///
/// # Example Response
///
/// ```json
/// {
///   "error": "invalid_grant",
///   "error_description": "Authorization code expired"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }

    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidRequest, description)
    }

    #[must_use]
    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidClient, description)
    }

    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidGrant, description)
    }

    #[must_use]
    pub fn unauthorized_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnauthorizedClient, description)
    }

    #[must_use]
    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnsupportedGrantType, description)
    }

    #[must_use]
    pub fn invalid_scope(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidScope, description)
    }

    /// The description, or an empty string.
    #[must_use]
    pub fn description(&self) -> &str {
        self.error_description.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Converts protocol errors into their wire form.
///
/// Infrastructure errors are handed back unchanged so they cannot be
/// reported to the client as an authorization decision.
impl TryFrom<AuthError> for TokenError {
    type Error = AuthError;

    fn try_from(err: AuthError) -> Result<Self, Self::Error> {
        match err {
            AuthError::InvalidRequest { message } => Ok(Self::invalid_request(message)),
            AuthError::InvalidClient { message } => Ok(Self::invalid_client(message)),
            AuthError::InvalidGrant { message } => Ok(Self::invalid_grant(message)),
            AuthError::UnauthorizedClient { message } => Ok(Self::unauthorized_client(message)),
            AuthError::UnsupportedGrantType { grant_type } if grant_type.is_empty() => {
                Ok(Self::unsupported_grant_type("Missing grant_type parameter"))
            }
            AuthError::UnsupportedGrantType { grant_type } => Ok(Self::unsupported_grant_type(
                format!("Grant type '{}' is not supported", grant_type),
            )),
            AuthError::InvalidScope { message } => Ok(Self::invalid_scope(message)),
            other @ (AuthError::Storage { .. }
            | AuthError::Timeout { .. }
            | AuthError::Configuration { .. }
            | AuthError::Internal { .. }) => Err(other),
        }
    }
}

/// OAuth 2.0 token error codes.
///
/// Defined in RFC 6749 Section 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed (unknown client, no client authentication
    /// included, or unsupported authentication method).
    InvalidClient,

    /// The provided authorization grant or refresh token is invalid, expired,
    /// revoked, or was issued to another client.
    InvalidGrant,

    /// The authenticated client is not authorized to use this authorization
    /// grant type.
    UnauthorizedClient,

    /// The authorization grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The requested scope is invalid, unknown, malformed, or exceeds the scope
    /// granted by the resource owner.
    InvalidScope,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::InvalidScope => "invalid_scope",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::InvalidRequest
            | Self::InvalidGrant
            | Self::UnauthorizedClient
            | Self::UnsupportedGrantType
            | Self::InvalidScope => 400,
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let params = TokenRequestParameters::from_pairs([
            ("grant_type", "authorization_code"),
            ("code", "first"),
            ("code", "second"),
        ]);

        assert_eq!(params.get("code"), Some("first"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let params = TokenRequestParameters::new()
            .with("code", "")
            .with("redirect_uri", "   ");

        assert_eq!(params.get("code"), None);
        assert!(!params.contains("redirect_uri"));
        assert!(params.scopes().is_empty());
    }

    #[test]
    fn test_scopes_deduplicated_in_order() {
        let params = TokenRequestParameters::new().with("scope", "openid  api1 openid profile");
        assert_eq!(params.scopes(), vec!["openid", "api1", "profile"]);
    }

    #[test]
    fn test_parameters_serde_transparent() {
        let params: TokenRequestParameters =
            serde_json::from_str(r#"[["grant_type","password"],["username","bob"]]"#).unwrap();
        assert_eq!(params.get("username"), Some("bob"));
    }

    #[test]
    fn test_token_response_serialization() {
        let response = TokenResponse::new(
            "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9...".to_string(),
            3600,
            "openid api1".to_string(),
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""token_type":"Bearer""#));
        assert!(json.contains(r#""expires_in":3600"#));
        assert!(json.contains(r#""scope":"openid api1""#));
        assert!(!json.contains(r#""refresh_token":"#));
        assert!(!json.contains(r#""id_token":"#));
    }

    #[test]
    fn test_token_error_wire_format() {
        let error = TokenError::invalid_grant("Authorization code expired");

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Authorization code expired"
            })
        );

        let parsed: TokenError = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, error);
    }

    #[test]
    fn test_token_error_without_description() {
        let error = TokenError::new(TokenErrorCode::InvalidClient);

        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"error":"invalid_client"}"#);
        assert_eq!(error.description(), "");
    }

    #[test]
    fn test_try_from_protocol_errors() {
        let error = TokenError::try_from(AuthError::invalid_grant("bad stuff")).unwrap();
        assert_eq!(error.error, TokenErrorCode::InvalidGrant);
        assert_eq!(error.description(), "bad stuff");

        let error = TokenError::try_from(AuthError::unsupported_grant_type("urn:x")).unwrap();
        assert_eq!(error.error, TokenErrorCode::UnsupportedGrantType);
        assert!(error.description().contains("urn:x"));
    }

    #[test]
    fn test_try_from_refuses_infrastructure_errors() {
        let result = TokenError::try_from(AuthError::storage("connection reset"));
        assert!(matches!(result, Err(AuthError::Storage { .. })));

        let result = TokenError::try_from(AuthError::timeout("authorization_code.try_consume"));
        assert!(matches!(result, Err(AuthError::Timeout { .. })));
    }

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(TokenErrorCode::InvalidRequest.http_status(), 400);
        assert_eq!(TokenErrorCode::InvalidClient.http_status(), 401);
        assert_eq!(TokenErrorCode::InvalidGrant.http_status(), 400);
        assert_eq!(TokenErrorCode::InvalidScope.http_status(), 400);
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(
            TokenErrorCode::UnauthorizedClient.as_str(),
            "unauthorized_client"
        );
        assert_eq!(
            TokenErrorCode::UnsupportedGrantType.as_str(),
            "unsupported_grant_type"
        );
        assert_eq!(TokenErrorCode::InvalidScope.to_string(), "invalid_scope");
    }
}
