//! Authenticated end-user principal.

use serde::{Deserialize, Serialize};

/// A single claim about a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// The resource owner a grant was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Stable identifier, emitted as the `sub` claim.
    pub subject_id: String,

    #[serde(default)]
    pub claims: Vec<Claim>,

    /// Where the subject authenticated (`idsrv` for local accounts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_provider: Option<String>,
}

impl Subject {
    #[must_use]
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            claims: Vec::new(),
            identity_provider: None,
        }
    }

    #[must_use]
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    #[must_use]
    pub fn with_identity_provider(mut self, idp: impl Into<String>) -> Self {
        self.identity_provider = Some(idp.into());
        self
    }

    /// Returns the first value of the given claim type.
    #[must_use]
    pub fn find_claim(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_claim() {
        let subject = Subject::new("818727")
            .with_claim("name", "Alice")
            .with_claim("email", "alice@example.com")
            .with_claim("email", "alice@work.example.com");

        assert_eq!(subject.find_claim("name"), Some("Alice"));
        assert_eq!(subject.find_claim("email"), Some("alice@example.com"));
        assert_eq!(subject.find_claim("role"), None);
    }

    #[test]
    fn test_claim_serializes_type_field() {
        let json = serde_json::to_string(&Claim::new("name", "Alice")).unwrap();
        assert_eq!(json, r#"{"type":"name","value":"Alice"}"#);
    }
}
