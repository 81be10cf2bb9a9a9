//! Extension grant support.
//!
//! Hosts register a [`CustomGrantValidator`] per `grant_type` value at
//! startup. The registry is immutable once handed to the validator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::token::TokenRequestParameters;
use crate::oauth::validated::ValidationResult;
use crate::types::Client;

/// Validates one extension grant type.
///
/// # Example
///
/// ```ignore
/// struct DelegationGrant;
///
/// #[async_trait::async_trait]
/// impl CustomGrantValidator for DelegationGrant {
///     fn grant_type(&self) -> &str {
///         "delegation"
///     }
///
///     async fn validate(
///         &self,
///         params: &TokenRequestParameters,
///         client: &Client,
///     ) -> AuthResult<ValidationResult> {
///         // inspect params.get("token"), build a ValidatedTokenRequest
///     }
/// }
/// ```
#[async_trait]
pub trait CustomGrantValidator: Send + Sync {
    /// The `grant_type` value this validator handles.
    fn grant_type(&self) -> &str;

    /// Validates the request for an authenticated client that is entitled
    /// to this grant.
    ///
    /// Granted scopes in a `Valid` result are filtered against the client's
    /// entitlement afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error for infrastructure failures only. Protocol failures
    /// are `Ok(ValidationResult::Invalid(..))`.
    async fn validate(
        &self,
        params: &TokenRequestParameters,
        client: &Client,
    ) -> AuthResult<ValidationResult>;
}

/// Lookup table of extension grant validators keyed by `grant_type`.
#[derive(Clone, Default)]
pub struct CustomGrantRegistry {
    validators: HashMap<String, Arc<dyn CustomGrantValidator>>,
}

impl CustomGrantRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator under its own `grant_type()`.
    ///
    /// A later registration for the same name replaces the earlier one.
    #[must_use]
    pub fn register(mut self, validator: Arc<dyn CustomGrantValidator>) -> Self {
        self.validators
            .insert(validator.grant_type().to_string(), validator);
        self
    }

    #[must_use]
    pub fn get(&self, grant_type: &str) -> Option<&Arc<dyn CustomGrantValidator>> {
        self.validators.get(grant_type)
    }

    #[must_use]
    pub fn contains(&self, grant_type: &str) -> bool {
        self.validators.contains_key(grant_type)
    }

    /// Registered grant type names.
    pub fn grant_types(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for CustomGrantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomGrantRegistry")
            .field("grant_types", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::token::TokenError;

    struct RejectingGrant(&'static str);

    #[async_trait]
    impl CustomGrantValidator for RejectingGrant {
        fn grant_type(&self) -> &str {
            self.0
        }

        async fn validate(
            &self,
            _params: &TokenRequestParameters,
            _client: &Client,
        ) -> AuthResult<ValidationResult> {
            Ok(TokenError::invalid_grant("rejected").into())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = CustomGrantRegistry::new()
            .register(Arc::new(RejectingGrant("delegation")))
            .register(Arc::new(RejectingGrant("urn:example:assertion")));

        assert!(registry.contains("delegation"));
        assert!(registry.get("urn:example:assertion").is_some());
        assert!(registry.get("password").is_none());
        assert_eq!(registry.grant_types().count(), 2);
    }

    #[test]
    fn test_empty_registry() {
        let registry = CustomGrantRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("delegation"));
    }
}
