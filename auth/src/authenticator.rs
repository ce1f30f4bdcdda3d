use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::config::ConfigError;
use crate::config::JwtSettings;
use crate::config::TokenSettings;
use crate::identity::IdentityContext;
use crate::jwt::IssueError;
use crate::jwt::IssuedToken;
use crate::jwt::KeyRing;
use crate::jwt::KeyStore;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenValidator;
use crate::jwt::ValidationError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token handling.
///
/// Issuer and validator share one [`KeyStore`], so a rotation through
/// [`Authenticator::keys`] is seen by both.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    settings: Arc<TokenSettings>,
    keys: KeyStore,
    issuer: TokenIssuer,
    validator: TokenValidator,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    IssueError(#[from] IssueError),
}

impl Authenticator {
    /// Create a new authenticator from validated settings.
    ///
    /// # Arguments
    /// * `settings` - Validated token settings
    /// * `keys` - Key ring shared by issuer and validator
    pub fn new(settings: TokenSettings, keys: KeyStore) -> Self {
        let settings = Arc::new(settings);

        Self {
            password_hasher: PasswordHasher::new(),
            issuer: TokenIssuer::new(Arc::clone(&settings), keys.clone()),
            validator: TokenValidator::new(Arc::clone(&settings), keys.clone()),
            settings,
            keys,
        }
    }

    /// Build an authenticator straight from raw configuration.
    ///
    /// # Errors
    /// * `ConfigError` - Settings or key material are missing or malformed
    pub fn from_settings(settings: JwtSettings) -> Result<Self, ConfigError> {
        let (settings, signing_key) = settings.into_parts()?;

        tracing::info!(
            issuer = %settings.issuer(),
            audience = %settings.audience(),
            kid = %signing_key.kid(),
            algorithm = %signing_key.algorithm(),
            expiry_minutes = settings.expiry().num_minutes(),
            clock_skew_seconds = settings.clock_skew().num_seconds(),
            "Token authentication configured"
        );

        Ok(Self::new(settings, KeyStore::new(KeyRing::signing(signing_key))))
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject_id` - Identifier of the principal owning `stored_hash`
    /// * `roles` - Roles granted to the principal
    /// * `now` - Current time
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `IssueError` - Token generation failed
    pub fn authenticate<I, R>(
        &self,
        password: &str,
        stored_hash: &str,
        subject_id: &str,
        roles: I,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthenticationError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issuer.issue(subject_id, roles, now)?)
    }

    /// Issue a token without password verification.
    ///
    /// For callers that have already authenticated the principal by other means.
    ///
    /// # Errors
    /// * `IssueError` - Token generation failed
    pub fn issue_token<I, R>(
        &self,
        subject_id: &str,
        roles: I,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, IssueError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.issuer.issue(subject_id, roles, now)
    }

    /// Validate a presented token.
    ///
    /// # Errors
    /// * `ValidationError` - Token is invalid or expired
    pub fn validate_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<IdentityContext, ValidationError> {
        self.validator.validate(token, now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::jwt::KeyAlgorithm;
    use crate::jwt::SigningKey;

    fn authenticator() -> Authenticator {
        let settings = TokenSettings::new("ordering-api", "ordering-client", 60, 300).unwrap();
        let key = SigningKey::from_secret(
            "primary",
            b"test_secret_key_at_least_32_bytes!",
            KeyAlgorithm::Hs256,
        )
        .unwrap();
        Authenticator::new(settings, KeyStore::new(KeyRing::signing(key)))
    }

    fn raw_settings() -> JwtSettings {
        JwtSettings {
            key: Some("test_secret_key_at_least_32_bytes!".to_string()),
            issuer: "ordering-api".to_string(),
            audience: "ordering-client".to_string(),
            expiry_minutes: Some(60),
            clock_skew_seconds: 300,
            algorithm: KeyAlgorithm::Hs256,
            key_id: "primary".to_string(),
            private_key_pem: None,
            public_key_pem: None,
            rotation_grace_minutes: None,
        }
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();
        let now = Utc::now();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let token = authenticator
            .authenticate(password, &hash, "u42", ["Admin"], now)
            .expect("Authentication failed");
        assert!(!token.access_token.is_empty());

        let identity = authenticator
            .validate_token(&token.access_token, now)
            .expect("Token validation failed");
        assert_eq!(identity.subject, "u42");
        assert!(identity.has_role("Admin"));
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result =
            authenticator.authenticate("wrong_password", &hash, "u42", ["Admin"], Utc::now());
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = authenticator();
        let now = Utc::now();

        let token = authenticator
            .issue_token("u42", Vec::<String>::new(), now)
            .expect("Failed to issue token");

        let identity = authenticator
            .validate_token(&token.access_token, now + Duration::minutes(59))
            .expect("Failed to validate token");
        assert_eq!(identity.subject, "u42");
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here", Utc::now());
        assert!(matches!(result, Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn test_rotation_visible_to_issuer_and_validator() {
        let authenticator = authenticator();
        let now = Utc::now();
        let before = authenticator.issue_token("u42", ["Admin"], now).unwrap();

        let next = SigningKey::from_secret(
            "secondary",
            b"rotated_secret_key_at_least_32_bytes",
            KeyAlgorithm::Hs256,
        )
        .unwrap();
        authenticator
            .keys()
            .rotate(next, now, authenticator.settings().rotation_grace())
            .unwrap();

        let after = authenticator.issue_token("u42", ["Admin"], now).unwrap();
        assert_eq!(after.key_id, "secondary");
        assert!(authenticator.validate_token(&before.access_token, now).is_ok());
        assert!(authenticator.validate_token(&after.access_token, now).is_ok());
    }

    #[test]
    fn test_from_settings() {
        let authenticator = Authenticator::from_settings(raw_settings()).unwrap();
        assert_eq!(authenticator.keys().load().active_kid(), "primary");
        assert_eq!(authenticator.settings().issuer(), "ordering-api");
    }

    #[test]
    fn test_from_settings_fails_fast_without_key() {
        let mut raw = raw_settings();
        raw.key = None;

        assert!(matches!(
            Authenticator::from_settings(raw),
            Err(ConfigError::MissingValue("jwt.key"))
        ));
    }
}
