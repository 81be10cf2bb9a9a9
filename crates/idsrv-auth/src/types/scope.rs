//! Scope catalog entries.

use serde::{Deserialize, Serialize};

/// Whether a scope describes identity data or API access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeType {
    /// Identity scope (claims about the subject, e.g. `openid`, `profile`).
    Identity,
    /// Resource scope (access to an API).
    Resource,
}

/// A claim emitted when a scope is granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeClaim {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Emit this claim in the identity token rather than only at userinfo.
    #[serde(default)]
    pub always_include_in_id_token: bool,
}

impl ScopeClaim {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            always_include_in_id_token: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A named permission in the scope catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Scope name as it appears in the `scope` parameter.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub scope_type: ScopeType,

    #[serde(default)]
    pub claims: Vec<ScopeClaim>,

    #[serde(default)]
    pub requires_consent: bool,

    /// Disabled scopes are never resolved.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Scope {
    /// Creates an enabled identity scope.
    #[must_use]
    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, ScopeType::Identity)
    }

    /// Creates an enabled resource scope.
    #[must_use]
    pub fn resource(name: impl Into<String>) -> Self {
        Self::new(name, ScopeType::Resource)
    }

    fn new(name: impl Into<String>, scope_type: ScopeType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            scope_type,
            claims: Vec::new(),
            requires_consent: false,
            enabled: true,
        }
    }

    /// Adds claims emitted for this scope.
    #[must_use]
    pub fn with_claims<I, S>(mut self, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.claims
            .extend(claims.into_iter().map(|c| ScopeClaim::new(c)));
        self
    }

    /// Marks the scope as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.scope_type == ScopeType::Identity
    }

    #[must_use]
    pub fn is_resource(&self) -> bool {
        self.scope_type == ScopeType::Resource
    }
}

/// The standard OpenID Connect scopes.
pub struct StandardScopes;

impl StandardScopes {
    pub const OPENID: &'static str = "openid";
    pub const PROFILE: &'static str = "profile";
    pub const EMAIL: &'static str = "email";
    pub const OFFLINE_ACCESS: &'static str = "offline_access";

    /// The `openid` scope, carrying the `sub` claim.
    #[must_use]
    pub fn openid() -> Scope {
        let mut scope = Scope::identity(Self::OPENID);
        scope.claims.push(ScopeClaim {
            name: "sub".to_string(),
            description: None,
            always_include_in_id_token: true,
        });
        scope
    }

    #[must_use]
    pub fn profile() -> Scope {
        Scope::identity(Self::PROFILE).with_claims([
            "name",
            "family_name",
            "given_name",
            "preferred_username",
            "updated_at",
        ])
    }

    #[must_use]
    pub fn email() -> Scope {
        Scope::identity(Self::EMAIL).with_claims(["email", "email_verified"])
    }

    /// `offline_access` gates refresh token issuance.
    #[must_use]
    pub fn offline_access() -> Scope {
        let mut scope = Scope::resource(Self::OFFLINE_ACCESS);
        scope.requires_consent = true;
        scope
    }

    /// All standard scopes.
    #[must_use]
    pub fn all() -> Vec<Scope> {
        vec![
            Self::openid(),
            Self::profile(),
            Self::email(),
            Self::offline_access(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scopes() {
        let openid = StandardScopes::openid();
        assert!(openid.is_identity());
        assert!(openid.claims.iter().any(|c| c.name == "sub"));

        let offline = StandardScopes::offline_access();
        assert!(offline.is_resource());
        assert!(offline.requires_consent);

        assert_eq!(StandardScopes::all().len(), 4);
    }

    #[test]
    fn test_scope_deserialize_defaults() {
        let scope: Scope =
            serde_json::from_str(r#"{"name":"api1","scopeType":"resource"}"#).unwrap();
        assert!(scope.enabled);
        assert!(scope.claims.is_empty());
        assert!(!scope.requires_consent);
    }

    #[test]
    fn test_disabled() {
        assert!(!Scope::resource("api1").disabled().enabled);
    }
}
