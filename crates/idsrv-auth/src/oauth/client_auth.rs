//! Client authentication for the token endpoint.
//!
//! # Authentication Methods
//!
//! - `none` - Public clients (no authentication)
//! - `client_secret_basic` - HTTP Basic Auth with client_id:client_secret
//! - `client_secret_post` - client_id and client_secret in request body
//!
//! # Authentication Priority
//!
//! When multiple authentication methods are present, they are tried in order:
//! 1. HTTP Basic Auth header
//! 2. client_secret_post (body parameters)
//! 3. Public client (client_id only)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::token::{TokenRequestParameters, params};
use crate::storage::ClientStorage;
use crate::types::Client;

/// Result of successful client authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// The authenticated client.
    pub client: Client,

    /// The authentication method used.
    pub auth_method: TokenEndpointAuthMethod,
}

impl AuthenticatedClient {
    /// Returns `true` if the client proved possession of a secret.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_method != TokenEndpointAuthMethod::None
    }
}

/// Token endpoint authentication methods.
///
/// Defined in OpenID Connect Core Section 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// No client authentication (public clients).
    None,

    /// Client secret via HTTP Basic Auth.
    ClientSecretBasic,

    /// Client secret in request body.
    ClientSecretPost,
}

impl TokenEndpointAuthMethod {
    /// Returns the string representation of the auth method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ClientSecretBasic => "client_secret_basic",
            Self::ClientSecretPost => "client_secret_post",
        }
    }
}

impl fmt::Display for TokenEndpointAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticates the client of a token request.
///
/// # Errors
///
/// Returns `AuthError::InvalidClient` if:
/// - No client credentials are provided
/// - The client is unknown or disabled
/// - The client secret is wrong or only matches expired secrets
/// - A confidential client omits its secret, or a public client sends one
///
/// Store failures are returned unchanged.
pub async fn authenticate_client(
    request: &TokenRequestParameters,
    basic_auth: Option<(&str, &str)>,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    if let Some((client_id, client_secret)) = basic_auth {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretBasic,
            client_storage,
        )
        .await;
    }

    if let (Some(client_id), Some(client_secret)) = (
        request.get(params::CLIENT_ID),
        request.get(params::CLIENT_SECRET),
    ) {
        return authenticate_with_secret(
            client_id,
            client_secret,
            TokenEndpointAuthMethod::ClientSecretPost,
            client_storage,
        )
        .await;
    }

    if let Some(client_id) = request.get(params::CLIENT_ID) {
        return authenticate_public(client_id, client_storage).await;
    }

    Err(AuthError::invalid_client("No client credentials provided"))
}

async fn load_enabled_client(
    client_id: &str,
    client_storage: &dyn ClientStorage,
) -> AuthResult<Client> {
    let client = client_storage
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

    if !client.enabled {
        return Err(AuthError::invalid_client("Client is disabled"));
    }

    Ok(client)
}

async fn authenticate_with_secret(
    client_id: &str,
    client_secret: &str,
    auth_method: TokenEndpointAuthMethod,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    let client = load_enabled_client(client_id, client_storage).await?;

    if !client.confidential {
        return Err(AuthError::invalid_client(format!(
            "Public clients cannot use {} authentication",
            auth_method
        )));
    }

    if !client.verify_secret(client_secret)? {
        return Err(AuthError::invalid_client("Invalid client secret"));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method,
    })
}

async fn authenticate_public(
    client_id: &str,
    client_storage: &dyn ClientStorage,
) -> AuthResult<AuthenticatedClient> {
    let client = load_enabled_client(client_id, client_storage).await?;

    if client.confidential {
        return Err(AuthError::invalid_client(
            "Confidential clients must provide client credentials",
        ));
    }

    Ok(AuthenticatedClient {
        client,
        auth_method: TokenEndpointAuthMethod::None,
    })
}

/// Parses an HTTP Basic Auth header value.
///
/// Returns `(client_id, client_secret)`. The decoded credentials are split
/// on the first colon, so the secret may itself contain colons.
///
/// # Example
///
/// ```
/// use idsrv_auth::oauth::client_auth::parse_basic_auth;
///
/// let parsed = parse_basic_auth("Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ=");
/// assert_eq!(parsed, Some(("client_id".to_string(), "client_secret".to_string())));
/// ```
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let encoded = header_value.trim().strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    let (client_id, client_secret) = credentials.split_once(':')?;

    Some((client_id.to_string(), client_secret.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClientSecret, GrantType};
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Mock client storage for testing.
    struct MockClientStorage {
        clients: RwLock<HashMap<String, Client>>,
    }

    impl MockClientStorage {
        fn new() -> Self {
            Self {
                clients: RwLock::new(HashMap::new()),
            }
        }

        fn add_client(&self, client: Client) {
            self.clients
                .write()
                .unwrap()
                .insert(client.client_id.clone(), client);
        }
    }

    #[async_trait::async_trait]
    impl ClientStorage for MockClientStorage {
        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            Ok(self.clients.read().unwrap().get(client_id).cloned())
        }
    }

    fn create_public_client() -> Client {
        Client {
            client_id: "public-client".to_string(),
            name: "Public Client".to_string(),
            enabled: true,
            confidential: false,
            client_secrets: vec![],
            grant_types: vec![GrantType::AuthorizationCode],
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            allowed_scopes: vec![],
            authorization_code_lifetime: None,
            access_token_lifetime: None,
            identity_token_lifetime: None,
            absolute_refresh_token_lifetime: None,
            sliding_refresh_token_lifetime: None,
            refresh_token_usage: Default::default(),
            refresh_token_expiration: Default::default(),
            access_token_type: Default::default(),
        }
    }

    fn create_confidential_client() -> Client {
        Client {
            client_id: "confidential-client".to_string(),
            name: "Confidential Client".to_string(),
            confidential: true,
            client_secrets: vec![ClientSecret::from_plaintext("secret123").unwrap()],
            grant_types: vec![GrantType::AuthorizationCode, GrantType::ClientCredentials],
            ..create_public_client()
        }
    }

    fn storage() -> MockClientStorage {
        let storage = MockClientStorage::new();
        storage.add_client(create_public_client());
        storage.add_client(create_confidential_client());
        storage
    }

    #[tokio::test]
    async fn test_authenticate_public_client() {
        let storage = storage();
        let params = TokenRequestParameters::new()
            .with("grant_type", "authorization_code")
            .with("client_id", "public-client");

        let auth = authenticate_client(&params, None, &storage).await.unwrap();
        assert_eq!(auth.client.client_id, "public-client");
        assert_eq!(auth.auth_method, TokenEndpointAuthMethod::None);
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticate_basic_auth() {
        let storage = storage();
        let params = TokenRequestParameters::new().with("grant_type", "client_credentials");

        let auth = authenticate_client(
            &params,
            Some(("confidential-client", "secret123")),
            &storage,
        )
        .await
        .unwrap();
        assert_eq!(auth.client.client_id, "confidential-client");
        assert_eq!(auth.auth_method, TokenEndpointAuthMethod::ClientSecretBasic);
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticate_secret_post() {
        let storage = storage();
        let params = TokenRequestParameters::new()
            .with("grant_type", "client_credentials")
            .with("client_id", "confidential-client")
            .with("client_secret", "secret123");

        let auth = authenticate_client(&params, None, &storage).await.unwrap();
        assert_eq!(auth.auth_method, TokenEndpointAuthMethod::ClientSecretPost);
    }

    #[tokio::test]
    async fn test_basic_auth_takes_priority_over_body() {
        let storage = storage();
        let params = TokenRequestParameters::new()
            .with("client_id", "public-client")
            .with("client_secret", "ignored");

        let auth = authenticate_client(
            &params,
            Some(("confidential-client", "secret123")),
            &storage,
        )
        .await
        .unwrap();
        assert_eq!(auth.client.client_id, "confidential-client");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_client() {
        let storage = storage();
        let params = TokenRequestParameters::new().with("client_id", "nobody");

        let result = authenticate_client(&params, None, &storage).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_disabled_client() {
        let storage = storage();
        let mut client = create_public_client();
        client.enabled = false;
        storage.add_client(client);

        let params = TokenRequestParameters::new().with("client_id", "public-client");
        let result = authenticate_client(&params, None, &storage).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_secret() {
        let storage = storage();
        let params = TokenRequestParameters::new();

        let result =
            authenticate_client(&params, Some(("confidential-client", "wrong")), &storage).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_confidential_client_requires_credentials() {
        let storage = storage();
        let params = TokenRequestParameters::new().with("client_id", "confidential-client");

        let result = authenticate_client(&params, None, &storage).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_public_client_cannot_use_basic_auth() {
        let storage = storage();
        let params = TokenRequestParameters::new();

        let result =
            authenticate_client(&params, Some(("public-client", "anything")), &storage).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_no_credentials_provided() {
        let storage = storage();
        let params = TokenRequestParameters::new().with("grant_type", "password");

        let result = authenticate_client(&params, None, &storage).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[test]
    fn test_parse_basic_auth_valid() {
        // "client_id:client_secret" base64 encoded
        let (id, secret) = parse_basic_auth("Basic Y2xpZW50X2lkOmNsaWVudF9zZWNyZXQ=").unwrap();
        assert_eq!(id, "client_id");
        assert_eq!(secret, "client_secret");
    }

    #[test]
    fn test_parse_basic_auth_with_colon_in_password() {
        // "client:pass:word" base64 encoded
        let (id, secret) = parse_basic_auth("Basic Y2xpZW50OnBhc3M6d29yZA==").unwrap();
        assert_eq!(id, "client");
        assert_eq!(secret, "pass:word");
    }

    #[test]
    fn test_parse_basic_auth_invalid_scheme() {
        assert!(parse_basic_auth("Bearer some-token").is_none());
    }

    #[test]
    fn test_parse_basic_auth_invalid_base64() {
        assert!(parse_basic_auth("Basic not-valid-base64!!!").is_none());
    }

    #[test]
    fn test_parse_basic_auth_no_colon() {
        // "clientonly" base64 encoded (no colon separator)
        assert!(parse_basic_auth("Basic Y2xpZW50b25seQ==").is_none());
    }

    #[test]
    fn test_auth_method_as_str() {
        assert_eq!(TokenEndpointAuthMethod::None.as_str(), "none");
        assert_eq!(
            TokenEndpointAuthMethod::ClientSecretBasic.as_str(),
            "client_secret_basic"
        );
        assert_eq!(
            TokenEndpointAuthMethod::ClientSecretPost.as_str(),
            "client_secret_post"
        );
    }
}
