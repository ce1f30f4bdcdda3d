use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::Header;
use serde::Serialize;
use uuid::Uuid;

use super::claims::TokenClaims;
use super::errors::IssueError;
use super::keyring::KeyStore;
use crate::config::TokenSettings;

/// Signed access token handed back to the client after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub key_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Mints signed, time-bounded access tokens.
///
/// Holds no memory of the tokens it issues; construct once and share.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    settings: Arc<TokenSettings>,
    keys: KeyStore,
}

impl TokenIssuer {
    pub fn new(settings: Arc<TokenSettings>, keys: KeyStore) -> Self {
        Self { settings, keys }
    }

    /// Issue an access token for an already authenticated principal.
    ///
    /// # Arguments
    /// * `subject_id` - Identifier of the principal, written to `sub`
    /// * `roles` - Role names granted to the principal (may be empty)
    /// * `issued_at` - Current time, written to `iat`
    ///
    /// # Returns
    /// Signed token expiring `expiry` after `issued_at`
    ///
    /// # Errors
    /// * `EmptySubject` - Subject identifier is blank
    /// * `NoSigningKey` - The key ring only holds verification keys
    /// * `Signing` - The signature primitive failed
    pub fn issue<I, R>(
        &self,
        subject_id: &str,
        roles: I,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, IssueError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let subject_id = subject_id.trim();
        if subject_id.is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let ring = self.keys.load();
        let key = ring.signing_key().ok_or(IssueError::NoSigningKey)?;

        let iat = issued_at.timestamp();
        let exp = iat + self.settings.expiry().num_seconds();
        let claims = TokenClaims {
            sub: subject_id.to_string(),
            iat,
            exp,
            iss: self.settings.issuer().to_string(),
            aud: self.settings.audience().to_string(),
            roles: roles.into_iter().map(Into::into).collect::<BTreeSet<_>>(),
            jti: Some(Uuid::new_v4().to_string()),
        };

        let mut header = Header::new(key.algorithm().as_jwt());
        header.kid = Some(key.kid().to_string());

        let access_token = encode(&header, &claims, key.encoding_key())
            .map_err(|e| IssueError::Signing(e.to_string()))?;

        let (issued_at, expires_at) = match (claims.issued_at(), claims.expires_at()) {
            (Some(issued_at), Some(expires_at)) => (issued_at, expires_at),
            _ => return Err(IssueError::Signing("timestamp out of range".to_string())),
        };

        tracing::debug!(
            subject = %claims.sub,
            kid = %key.kid(),
            expires_at = %expires_at,
            "Access token issued"
        );

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer",
            key_id: key.kid().to_string(),
            issued_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::jwt::keyring::KeyRing;
    use crate::jwt::keys::KeyAlgorithm;
    use crate::jwt::keys::SigningKey;

    const SECRET: &[u8] = b"ordering-signing-key-at-least-32-bytes!";

    fn issuer() -> TokenIssuer {
        let settings = TokenSettings::new("ordering-api", "ordering-client", 60, 300).unwrap();
        let key = SigningKey::from_secret("primary", SECRET, KeyAlgorithm::Hs256).unwrap();
        TokenIssuer::new(Arc::new(settings), KeyStore::new(KeyRing::signing(key)))
    }

    fn issued_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_issue_sets_lifetime() {
        let token = issuer().issue("u42", ["Admin"], issued_at()).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.key_id, "primary");
        assert_eq!(token.issued_at, issued_at());
        assert_eq!(token.expires_at, issued_at() + Duration::minutes(60));
        assert_eq!(token.access_token.split('.').count(), 3);
    }

    #[test]
    fn test_issue_writes_kid_header() {
        let token = issuer().issue("u42", ["Admin"], issued_at()).unwrap();

        let header = jsonwebtoken::decode_header(&token.access_token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("primary"));
        assert_eq!(header.alg, jsonwebtoken::Algorithm::HS256);
    }

    #[test]
    fn test_issue_rejects_empty_subject() {
        let result = issuer().issue("   ", Vec::<String>::new(), issued_at());
        assert_eq!(result, Err(IssueError::EmptySubject));
    }

    #[test]
    fn test_issue_without_signing_key() {
        let settings = TokenSettings::new("ordering-api", "ordering-client", 60, 300).unwrap();
        let key = SigningKey::from_secret("primary", SECRET, KeyAlgorithm::Hs256).unwrap();
        let issuer = TokenIssuer::new(
            Arc::new(settings),
            KeyStore::new(KeyRing::verifying(key.verification_key().clone())),
        );

        let result = issuer.issue("u42", ["Admin"], issued_at());
        assert_eq!(result, Err(IssueError::NoSigningKey));
    }

    #[test]
    fn test_issue_produces_distinct_tokens() {
        let issuer = issuer();
        let first = issuer.issue("u42", ["Admin"], issued_at()).unwrap();
        let second = issuer.issue("u42", ["Admin"], issued_at()).unwrap();

        // Distinct jti values make every token unique
        assert_ne!(first.access_token, second.access_token);
    }
}
