use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an access token.
///
/// Every registered claim the validator checks is mandatory, so a payload
/// missing any of them fails to deserialize and is reported as malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Role names granted to the subject
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// JWT ID (unique token identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl TokenClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check the `exp > iat` invariant.
    pub fn has_valid_lifetime(&self) -> bool {
        self.exp > self.iat
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "u42".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            iss: "ordering-api".to_string(),
            aud: "ordering-client".to_string(),
            roles: BTreeSet::from(["Admin".to_string(), "Clerk".to_string()]),
            jti: None,
        }
    }

    #[test]
    fn test_timestamps() {
        let claims = claims();

        assert_eq!(claims.issued_at().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_003_600);
        assert!(claims.has_valid_lifetime());
    }

    #[test]
    fn test_lifetime_invariant() {
        let mut claims = claims();
        claims.exp = claims.iat;
        assert!(!claims.has_valid_lifetime());
    }

    #[test]
    fn test_roles_serialize_sorted() {
        let json = serde_json::to_value(claims()).unwrap();

        assert_eq!(json["roles"], serde_json::json!(["Admin", "Clerk"]));
        assert!(json.get("jti").is_none());
    }

    #[test]
    fn test_missing_required_claim_fails() {
        let payload = serde_json::json!({
            "sub": "u42",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
            "iss": "ordering-api"
        });

        assert!(serde_json::from_value::<TokenClaims>(payload).is_err());
    }

    #[test]
    fn test_roles_default_to_empty() {
        let payload = serde_json::json!({
            "sub": "u42",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
            "iss": "ordering-api",
            "aud": "ordering-client"
        });

        let claims: TokenClaims = serde_json::from_value(payload).unwrap();
        assert!(claims.roles.is_empty());
        assert!(!claims.has_role("Admin"));
    }
}
