//! OAuth 2.0 Token endpoint handler.
//!
//! Parses the form body, authenticates the client, runs the
//! [`TokenRequestValidator`] and hands validated requests to the host's
//! [`TokenIssuer`].
//!
//! # Example
//!
//! ```ignore
//! // Authorization code grant
//! POST /connect/token
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <base64(client_id:client_secret)>
//!
//! grant_type=authorization_code
//! &code=SplxlOBeZQQYbYS6WxSbIA
//! &redirect_uri=https://app.example.com/callback
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info, warn};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::client_auth::{AuthenticatedClient, authenticate_client, parse_basic_auth};
use crate::oauth::token::{TokenError, TokenRequestParameters, TokenResponse, params};
use crate::oauth::validated::{ValidatedTokenRequest, ValidationResult};
use crate::oauth::validator::TokenRequestValidator;
use crate::storage::ClientStorage;

/// Mints tokens for a validated request.
///
/// Implementations own signing, reference token storage and, when
/// `GrantArtifact::RefreshToken { rotate: true, .. }` is set, storing the
/// replacement refresh token.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Issues the token response.
    ///
    /// # Errors
    ///
    /// Protocol variants of `AuthError` are reported to the client; any
    /// other error becomes a `server_error` response.
    async fn issue(&self, request: &ValidatedTokenRequest) -> AuthResult<TokenResponse>;
}

/// State required for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    validator: Arc<TokenRequestValidator>,
    client_storage: Arc<dyn ClientStorage>,
    issuer: Arc<dyn TokenIssuer>,
}

impl TokenState {
    /// Creates a new token state.
    pub fn new(
        validator: Arc<TokenRequestValidator>,
        client_storage: Arc<dyn ClientStorage>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            validator,
            client_storage,
            issuer,
        }
    }
}

/// OAuth 2.0 token endpoint handler.
///
/// Handles POST requests with an `application/x-www-form-urlencoded` body.
/// Duplicate form fields are kept; the first occurrence wins.
pub async fn token_handler(
    State(state): State<TokenState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let request = TokenRequestParameters::from_pairs(pairs);

    debug!(
        grant_type = ?request.get(params::GRANT_TYPE),
        client_id = ?request.get(params::CLIENT_ID),
        "Processing token request"
    );

    let client = match authenticate(&state, &headers, &request).await {
        Ok(client) => client,
        Err(e) => return server_error_response(&e),
    };

    let validated = match state.validator.validate(&request, client.as_ref()).await {
        Ok(ValidationResult::Valid(validated)) => validated,
        Ok(ValidationResult::Invalid(e)) => return token_error_response(e),
        Err(e) => return server_error_response(&e),
    };

    match state.issuer.issue(&validated).await {
        Ok(response) => {
            info!(
                client_id = %validated.client.client_id,
                grant_type = %validated.grant_type,
                "Token issued successfully"
            );
            token_success_response(response)
        }
        Err(e) => match TokenError::try_from(e) {
            Ok(protocol) => {
                warn!(
                    client_id = %validated.client.client_id,
                    error = %protocol,
                    "Token issuance rejected"
                );
                token_error_response(protocol)
            }
            Err(fatal) => server_error_response(&fatal),
        },
    }
}

/// Runs client authentication.
///
/// A rejected client is reported as `Ok(None)` so the validator can apply
/// its own ordering (an unsupported grant type wins over a bad client).
async fn authenticate(
    state: &TokenState,
    headers: &HeaderMap,
    request: &TokenRequestParameters,
) -> AuthResult<Option<AuthenticatedClient>> {
    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth);
    let basic = basic.as_ref().map(|(id, secret)| (id.as_str(), secret.as_str()));

    match authenticate_client(request, basic, state.client_storage.as_ref()).await {
        Ok(client) => Ok(Some(client)),
        Err(e) if e.is_client_error() => {
            warn!(error = %e, "Client authentication failed");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Build a successful token response.
fn token_success_response(response: TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(response),
    )
        .into_response()
}

/// Build an error response for token endpoint.
fn token_error_response(error: TokenError) -> Response {
    let status = match error.error.http_status() {
        401 => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_REQUEST,
    };

    let mut response = (
        status,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(error),
    )
        .into_response();

    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
    }
    response
}

/// Build a 500 response. The cause is logged, never returned.
fn server_error_response(error: &AuthError) -> Response {
    error!(
        error = %error,
        category = %error.category(),
        "Token endpoint failed"
    );

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(serde_json::json!({ "error": error.oauth_error_code() })),
    )
        .into_response()
}
