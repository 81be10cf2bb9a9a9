//! Scope resolution against the catalog and client entitlement.
//!
//! Unknown and disabled scope names are dropped rather than rejected. The
//! caller decides whether an empty result is an error.

use crate::AuthResult;
use crate::storage::ScopeCatalog;
use crate::types::{Client, Scope};

/// Resolves scope names to catalog entries, keeping request order.
///
/// Duplicate names resolve once. Calling this twice with the same input
/// against an unchanged catalog yields the same output.
///
/// # Errors
///
/// Returns an error if the catalog lookup fails.
pub async fn resolve_scopes(
    catalog: &dyn ScopeCatalog,
    names: &[String],
) -> AuthResult<Vec<Scope>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let found = catalog.find_scopes(names).await?;

    let mut resolved: Vec<Scope> = Vec::with_capacity(names.len());
    for name in names {
        if resolved.iter().any(|s| &s.name == name) {
            continue;
        }
        if let Some(scope) = found.iter().find(|s| &s.name == name && s.enabled) {
            resolved.push(scope.clone());
        }
    }
    Ok(resolved)
}

/// Every enabled catalog scope the client is entitled to, in catalog order.
///
/// # Errors
///
/// Returns an error if the catalog lookup fails.
pub async fn entitled_scopes(
    catalog: &dyn ScopeCatalog,
    client: &Client,
) -> AuthResult<Vec<Scope>> {
    let all = catalog.all_scopes().await?;
    Ok(filter_entitled(client, all))
}

/// Drops scopes the client is not entitled to or that are disabled.
#[must_use]
pub fn filter_entitled(client: &Client, scopes: Vec<Scope>) -> Vec<Scope> {
    scopes
        .into_iter()
        .filter(|s| s.enabled && client.is_scope_allowed(&s.name))
        .collect()
}

/// Names that are in `requested` but not in `allowed`.
#[must_use]
pub fn excess_scopes<'a>(requested: &'a [String], allowed: &[String]) -> Vec<&'a str> {
    requested
        .iter()
        .filter(|name| !allowed.contains(name))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GrantType, StandardScopes};

    struct StaticCatalog(Vec<Scope>);

    #[async_trait::async_trait]
    impl ScopeCatalog for StaticCatalog {
        async fn find_scopes(&self, names: &[String]) -> AuthResult<Vec<Scope>> {
            // reversed to prove the resolver restores request order
            Ok(self
                .0
                .iter()
                .rev()
                .filter(|s| names.contains(&s.name))
                .cloned()
                .collect())
        }

        async fn all_scopes(&self) -> AuthResult<Vec<Scope>> {
            Ok(self.0.clone())
        }
    }

    fn catalog() -> StaticCatalog {
        let mut scopes = StandardScopes::all();
        scopes.push(Scope::resource("read"));
        scopes.push(Scope::resource("write"));
        scopes.push(Scope::resource("legacy").disabled());
        StaticCatalog(scopes)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn client(allowed: &[&str]) -> Client {
        Client {
            client_id: "client".to_string(),
            name: "Client".to_string(),
            enabled: true,
            confidential: true,
            client_secrets: vec![],
            grant_types: vec![GrantType::ClientCredentials],
            redirect_uris: vec![],
            allowed_scopes: names(allowed),
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

    #[tokio::test]
    async fn test_resolve_keeps_request_order() {
        let resolved = resolve_scopes(&catalog(), &names(&["write", "openid", "read"]))
            .await
            .unwrap();
        let resolved: Vec<&str> = resolved.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(resolved, vec!["write", "openid", "read"]);
    }

    #[tokio::test]
    async fn test_resolve_drops_unknown_and_disabled() {
        let resolved = resolve_scopes(&catalog(), &names(&["read", "nope", "legacy"]))
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "read");
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let catalog = catalog();
        let input = names(&["openid", "read", "openid", "unknown"]);

        let first = resolve_scopes(&catalog, &input).await.unwrap();
        let second = resolve_scopes(&catalog, &input).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_empty_input() {
        assert!(resolve_scopes(&catalog(), &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entitled_scopes() {
        let entitled = entitled_scopes(&catalog(), &client(&["read", "legacy"]))
            .await
            .unwrap();
        assert_eq!(entitled.len(), 1);
        assert_eq!(entitled[0].name, "read");

        // empty allow-list means every enabled scope
        let entitled = entitled_scopes(&catalog(), &client(&[])).await.unwrap();
        assert_eq!(entitled.len(), 6);
    }

    #[test]
    fn test_excess_scopes() {
        let requested = names(&["read", "admin"]);
        let allowed = names(&["read"]);
        assert_eq!(excess_scopes(&requested, &allowed), vec!["admin"]);
        assert!(excess_scopes(&allowed, &requested).is_empty());
    }
}
