//! Validation outcome types.

use crate::oauth::token::{TokenError, TokenRequestParameters};
use crate::types::{AuthorizationCode, Client, GrantType, RefreshToken, Scope, Subject};

/// The grant artifact a validated request was derived from.
#[derive(Debug, Clone)]
pub enum GrantArtifact {
    /// No artifact (client_credentials, password, most custom grants).
    None,

    /// The authorization code that was consumed.
    AuthorizationCode(AuthorizationCode),

    /// The refresh token that was redeemed.
    RefreshToken {
        token: RefreshToken,
        /// The token was removed from the store; the issuer must mint a
        /// replacement with the same subject and scopes.
        rotate: bool,
    },
}

/// A token request that passed every check and is ready for issuance.
#[derive(Debug, Clone)]
pub struct ValidatedTokenRequest {
    pub grant_type: GrantType,
    pub client: Client,
    /// `None` for client_credentials.
    pub subject: Option<Subject>,
    /// Final granted scopes.
    pub scopes: Vec<Scope>,
    pub artifact: GrantArtifact,
    /// The raw request, for issuers that need extension parameters.
    pub raw: TokenRequestParameters,
}

impl ValidatedTokenRequest {
    #[must_use]
    pub fn new(grant_type: GrantType, client: Client, raw: TokenRequestParameters) -> Self {
        Self {
            grant_type,
            client,
            subject: None,
            scopes: Vec::new(),
            artifact: GrantArtifact::None,
            raw,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_artifact(mut self, artifact: GrantArtifact) -> Self {
        self.artifact = artifact;
        self
    }

    /// Granted scope names in grant order.
    #[must_use]
    pub fn scope_names(&self) -> Vec<&str> {
        self.scopes.iter().map(|s| s.name.as_str()).collect()
    }

    /// Space-delimited granted scopes, as returned in the token response.
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scope_names().join(" ")
    }

    /// Returns `true` if `openid` was granted.
    #[must_use]
    pub fn is_open_id(&self) -> bool {
        self.scopes.iter().any(|s| s.name == "openid")
    }
}

/// Outcome of token request validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    Valid(Box<ValidatedTokenRequest>),
    Invalid(TokenError),
}

impl ValidationResult {
    #[must_use]
    pub fn valid(request: ValidatedTokenRequest) -> Self {
        Self::Valid(Box::new(request))
    }

    #[must_use]
    pub fn invalid(error: TokenError) -> Self {
        Self::Invalid(error)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    #[must_use]
    pub fn validated(&self) -> Option<&ValidatedTokenRequest> {
        match self {
            Self::Valid(request) => Some(request),
            Self::Invalid(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&TokenError> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(error) => Some(error),
        }
    }
}

impl From<TokenError> for ValidationResult {
    fn from(error: TokenError) -> Self {
        Self::Invalid(error)
    }
}

impl From<ValidatedTokenRequest> for ValidationResult {
    fn from(request: ValidatedTokenRequest) -> Self {
        Self::valid(request)
    }
}
