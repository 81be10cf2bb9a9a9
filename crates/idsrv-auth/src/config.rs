//! Token endpoint configuration.
//!
//! Per-client settings on [`Client`](crate::types::Client) override the
//! lifetimes configured here.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::GrantType;

/// Root configuration.
///
/// # Example (TOML)
///
/// ```toml
/// issuer = "https://idsrv.example.com"
///
/// [oauth]
/// authorization_code_lifetime = "5m"
/// refresh_token_lifetime = "30d"
/// store_timeout = "5s"
/// grant_types = ["authorization_code", "refresh_token"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server issuer URL (used in token `iss` claim).
    pub issuer: String,

    /// OAuth 2.0 configuration.
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            oauth: OAuthConfig::default(),
        }
    }
}

/// OAuth 2.0 configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Default authorization code lifetime, for clients without an override.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Default refresh token lifetime, for clients without an override.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Upper bound on any single store or collaborator call.
    #[serde(with = "humantime_serde")]
    pub store_timeout: Duration,

    /// Enabled built-in grant types.
    /// Supported: "authorization_code", "client_credentials", "password",
    /// "refresh_token". Extension grants are enabled by registering a
    /// validator and are not listed here.
    pub grant_types: Vec<String>,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(300), // 5 minutes
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600), // 30 days
            store_timeout: Duration::from_secs(5),
            grant_types: vec![
                "authorization_code".to_string(),
                "client_credentials".to_string(),
                "password".to_string(),
                "refresh_token".to_string(),
            ],
        }
    }
}

impl OAuthConfig {
    /// Returns `true` if the built-in grant is enabled. Custom grants are
    /// always reported as enabled.
    #[must_use]
    pub fn is_grant_enabled(&self, grant_type: &GrantType) -> bool {
        grant_type.is_custom() || self.grant_types.iter().any(|g| g == grant_type.as_str())
    }

    /// The default authorization code lifetime as a `time::Duration`.
    #[must_use]
    pub fn authorization_code_ttl(&self) -> time::Duration {
        time::Duration::try_from(self.authorization_code_lifetime)
            .unwrap_or(time::Duration::minutes(5))
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration source could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl AuthConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and the errors of
    /// [`validate`](Self::validate) otherwise.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the issuer is empty, and
    /// `ConfigError::InvalidValue` if:
    /// - A lifetime or the store timeout is zero
    /// - An unknown built-in grant type is listed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Missing("issuer".to_string()));
        }

        if self.oauth.authorization_code_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_code_lifetime must be > 0".to_string(),
            ));
        }

        if self.oauth.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "refresh_token_lifetime must be > 0".to_string(),
            ));
        }

        if self.oauth.store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "store_timeout must be > 0".to_string(),
            ));
        }

        for grant in &self.oauth.grant_types {
            if GrantType::parse(grant).is_custom() {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid grant type: '{}'. Must be authorization_code, client_credentials, password, or refresh_token",
                    grant
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.oauth.authorization_code_lifetime, Duration::from_secs(300));
        assert_eq!(config.oauth.store_timeout, Duration::from_secs(5));
        assert_eq!(config.oauth.grant_types.len(), 4);
    }

    #[test]
    fn test_empty_issuer_fails_validation() {
        let mut config = AuthConfig::default();
        config.issuer = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_zero_store_timeout_fails_validation() {
        let mut config = AuthConfig::default();
        config.oauth.store_timeout = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_invalid_grant_type_fails_validation() {
        let mut config = AuthConfig::default();
        config.oauth.grant_types.push("implicit".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_is_grant_enabled() {
        let mut config = OAuthConfig::default();
        config.grant_types = vec!["authorization_code".to_string()];

        assert!(config.is_grant_enabled(&GrantType::AuthorizationCode));
        assert!(!config.is_grant_enabled(&GrantType::Password));
        assert!(config.is_grant_enabled(&GrantType::Custom("delegation".to_string())));
    }

    #[test]
    fn test_from_toml_str() {
        let config = AuthConfig::from_toml_str(
            r#"
            issuer = "https://idsrv.example.com"

            [oauth]
            authorization_code_lifetime = "2m"
            store_timeout = "250ms"
            grant_types = ["authorization_code", "refresh_token"]
            "#,
        )
        .unwrap();

        assert_eq!(config.issuer, "https://idsrv.example.com");
        assert_eq!(config.oauth.authorization_code_lifetime, Duration::from_secs(120));
        assert_eq!(config.oauth.store_timeout, Duration::from_millis(250));
        // unspecified fields keep their defaults
        assert_eq!(
            config.oauth.refresh_token_lifetime,
            Duration::from_secs(30 * 24 * 3600)
        );
        assert_eq!(config.oauth.authorization_code_ttl(), time::Duration::minutes(2));
    }

    #[test]
    fn test_from_toml_str_parse_error() {
        let result = AuthConfig::from_toml_str("issuer = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_toml_str_runs_validation() {
        let result = AuthConfig::from_toml_str(
            r#"
            [oauth]
            grant_types = ["implicit"]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("test error".to_string());
        assert_eq!(err.to_string(), "Invalid configuration value: test error");

        let err = ConfigError::Missing("issuer".to_string());
        assert_eq!(err.to_string(), "Missing required configuration: issuer");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = AuthConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.issuer, parsed.issuer);
        assert_eq!(config.oauth.store_timeout, parsed.oauth.store_timeout);
    }
}
