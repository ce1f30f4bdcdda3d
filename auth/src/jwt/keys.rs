use std::fmt;

use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;

use crate::config::ConfigError;

/// Minimum shared secret length for HMAC signing (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Signing algorithms supported for access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
    Rs256,
}

impl KeyAlgorithm {
    /// Whether signing and verification share the same secret.
    pub fn is_symmetric(self) -> bool {
        !matches!(self, KeyAlgorithm::Rs256)
    }

    pub(crate) fn as_jwt(self) -> Algorithm {
        match self {
            KeyAlgorithm::Hs256 => Algorithm::HS256,
            KeyAlgorithm::Hs384 => Algorithm::HS384,
            KeyAlgorithm::Hs512 => Algorithm::HS512,
            KeyAlgorithm::Rs256 => Algorithm::RS256,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_jwt())
    }
}

/// Key material able to verify token signatures, and nothing more.
///
/// For RS256 this holds only the public key, so a validator built from it can
/// run on hosts that never see the signing secret.
#[derive(Clone)]
pub struct VerificationKey {
    kid: String,
    algorithm: KeyAlgorithm,
    decoding_key: DecodingKey,
}

impl VerificationKey {
    /// Build a verification key from a shared HMAC secret.
    ///
    /// # Errors
    /// * `InvalidKey` - Key id is empty, secret is too short, or algorithm is not HMAC
    pub fn from_secret(
        kid: &str,
        secret: &[u8],
        algorithm: KeyAlgorithm,
    ) -> Result<Self, ConfigError> {
        check_kid(kid)?;
        check_secret(secret, algorithm)?;

        Ok(Self {
            kid: kid.to_string(),
            algorithm,
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Build an RS256 verification key from a PEM encoded public key.
    ///
    /// # Errors
    /// * `InvalidKey` - Key id is empty or the PEM cannot be parsed
    pub fn from_rsa_pem(kid: &str, public_pem: &[u8]) -> Result<Self, ConfigError> {
        check_kid(kid)?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| ConfigError::InvalidKey(format!("RSA public key '{}': {}", kid, e)))?;

        Ok(Self {
            kid: kid.to_string(),
            algorithm: KeyAlgorithm::Rs256,
            decoding_key,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Key material used by the issuer to sign tokens.
///
/// Always carries its matching [`VerificationKey`] so a ring built around it
/// can verify what it signs.
#[derive(Clone)]
pub struct SigningKey {
    encoding_key: EncodingKey,
    verification: VerificationKey,
}

impl SigningKey {
    /// Build an HMAC signing key from a shared secret.
    ///
    /// # Arguments
    /// * `kid` - Key identifier written into the token header
    /// * `secret` - Shared secret, at least 32 bytes
    /// * `algorithm` - One of the HMAC algorithms
    ///
    /// # Errors
    /// * `InvalidKey` - Key id is empty, secret is too short, or algorithm is not HMAC
    pub fn from_secret(
        kid: &str,
        secret: &[u8],
        algorithm: KeyAlgorithm,
    ) -> Result<Self, ConfigError> {
        let verification = VerificationKey::from_secret(kid, secret, algorithm)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            verification,
        })
    }

    /// Build an RS256 signing key from PEM encoded private and public keys.
    ///
    /// # Errors
    /// * `InvalidKey` - Key id is empty or either PEM cannot be parsed
    pub fn from_rsa_pem(
        kid: &str,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, ConfigError> {
        let verification = VerificationKey::from_rsa_pem(kid, public_pem)?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| ConfigError::InvalidKey(format!("RSA private key '{}': {}", kid, e)))?;

        Ok(Self {
            encoding_key,
            verification,
        })
    }

    pub fn kid(&self) -> &str {
        self.verification.kid()
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.verification.algorithm()
    }

    /// The key that verifies signatures produced by this key.
    pub fn verification_key(&self) -> &VerificationKey {
        &self.verification
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid())
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

fn check_kid(kid: &str) -> Result<(), ConfigError> {
    if kid.trim().is_empty() {
        return Err(ConfigError::InvalidKey("key id must not be empty".to_string()));
    }
    Ok(())
}

fn check_secret(secret: &[u8], algorithm: KeyAlgorithm) -> Result<(), ConfigError> {
    if !algorithm.is_symmetric() {
        return Err(ConfigError::InvalidKey(format!(
            "{} cannot be used with a shared secret",
            algorithm
        )));
    }
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InvalidKey(format!(
            "shared secret must be at least {} bytes, got {}",
            MIN_SECRET_LENGTH,
            secret.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_secret() {
        let key = SigningKey::from_secret(
            "primary",
            b"ordering-signing-key-at-least-32-bytes!",
            KeyAlgorithm::Hs256,
        )
        .unwrap();

        assert_eq!(key.kid(), "primary");
        assert_eq!(key.algorithm(), KeyAlgorithm::Hs256);
        assert_eq!(key.verification_key().kid(), "primary");
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = SigningKey::from_secret("primary", b"short", KeyAlgorithm::Hs256);
        assert!(matches!(result, Err(ConfigError::InvalidKey(_))));

        let result = SigningKey::from_secret("primary", b"", KeyAlgorithm::Hs512);
        assert!(matches!(result, Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_empty_kid_rejected() {
        let result = VerificationKey::from_secret(
            " ",
            b"ordering-signing-key-at-least-32-bytes!",
            KeyAlgorithm::Hs256,
        );
        assert!(matches!(result, Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_secret_with_rsa_algorithm_rejected() {
        let result = SigningKey::from_secret(
            "primary",
            b"ordering-signing-key-at-least-32-bytes!",
            KeyAlgorithm::Rs256,
        );
        assert!(matches!(result, Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_invalid_pem_rejected() {
        let result = VerificationKey::from_rsa_pem("primary", b"not a pem");
        assert!(matches!(result, Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let key = SigningKey::from_secret(
            "primary",
            b"ordering-signing-key-at-least-32-bytes!",
            KeyAlgorithm::Hs256,
        )
        .unwrap();

        let debug = format!("{:?}", key);
        assert!(debug.contains("primary"));
        assert!(!debug.contains("ordering-signing-key"));
    }

    #[test]
    fn test_algorithm_deserializes_uppercase() {
        let algorithm: KeyAlgorithm = serde_json::from_str("\"RS256\"").unwrap();
        assert_eq!(algorithm, KeyAlgorithm::Rs256);
        assert!(!algorithm.is_symmetric());
        assert_eq!(algorithm.to_string(), "RS256");
    }
}
