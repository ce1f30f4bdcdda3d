use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::errors::ValidationError;
use super::keyring::KeyStore;
use super::keys::VerificationKey;
use crate::config::TokenSettings;
use crate::identity::IdentityContext;

/// Validates presented access tokens and yields the caller's identity.
///
/// Validation is a pure function of the token, `now`, the configured
/// settings and the current key ring snapshot.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    settings: Arc<TokenSettings>,
    keys: KeyStore,
}

impl TokenValidator {
    pub fn new(settings: Arc<TokenSettings>, keys: KeyStore) -> Self {
        Self { settings, keys }
    }

    /// Validate a presented token.
    ///
    /// Checks run in order and stop at the first failure: structure,
    /// signature, issuer, audience, then lifetime widened by the clock skew
    /// on both ends.
    ///
    /// # Arguments
    /// * `token` - Raw token string, without the `Bearer ` prefix
    /// * `now` - Current time
    ///
    /// # Returns
    /// Identity of the token's subject
    ///
    /// # Errors
    /// * `Malformed` - Token cannot be parsed or misses a required claim
    /// * `InvalidSignature` - No trusted key verifies the signature
    /// * `InvalidIssuer` - `iss` differs from the configured issuer
    /// * `InvalidAudience` - `aud` differs from the configured audience
    /// * `Expired` - `now` is outside `[iat - skew, exp + skew]`
    pub fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<IdentityContext, ValidationError> {
        let (kid, claims) = parse_unverified(token)?;

        let ring = self.keys.load();
        let key = ring.resolve(kid.as_deref(), now).ok_or_else(|| {
            tracing::debug!(kid = ?kid, "No trusted key for token");
            ValidationError::InvalidSignature
        })?;
        verify_signature(token, key)?;

        if claims.iss != self.settings.issuer() {
            return Err(ValidationError::InvalidIssuer);
        }

        if claims.aud != self.settings.audience() {
            return Err(ValidationError::InvalidAudience);
        }

        let (issued_at, expires_at) = match (claims.issued_at(), claims.expires_at()) {
            (Some(issued_at), Some(expires_at)) => (issued_at, expires_at),
            _ => return Err(ValidationError::Malformed("timestamp out of range".to_string())),
        };
        let skew = self.settings.clock_skew();
        let (earliest, latest) = match (
            issued_at.checked_sub_signed(skew),
            expires_at.checked_add_signed(skew),
        ) {
            (Some(earliest), Some(latest)) => (earliest, latest),
            _ => return Err(ValidationError::Malformed("timestamp out of range".to_string())),
        };
        if now > latest || now < earliest {
            return Err(ValidationError::Expired);
        }

        Ok(IdentityContext {
            subject: claims.sub,
            roles: claims.roles,
            expires_at,
            key_id: key.kid().to_string(),
        })
    }
}

/// Parse header and claims without trusting them.
fn parse_unverified(token: &str) -> Result<(Option<String>, TokenClaims), ValidationError> {
    let header = decode_header(token).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    relax_claim_checks(&mut validation);

    let token_data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let claims = token_data.claims;
    if claims.sub.trim().is_empty() {
        return Err(ValidationError::Malformed("empty subject".to_string()));
    }
    if !claims.has_valid_lifetime() {
        return Err(ValidationError::Malformed(
            "expiry precedes issue time".to_string(),
        ));
    }

    Ok((header.kid, claims))
}

/// Verify the signature with `key`, accepting only the key's own algorithm.
fn verify_signature(token: &str, key: &VerificationKey) -> Result<(), ValidationError> {
    let mut validation = Validation::new(key.algorithm().as_jwt());
    relax_claim_checks(&mut validation);

    decode::<TokenClaims>(token, key.decoding_key(), &validation)
        .map(|_| ())
        .map_err(|e| match e.kind() {
            ErrorKind::Json(_) => ValidationError::Malformed(e.to_string()),
            _ => {
                tracing::debug!(kid = %key.kid(), error = %e, "Signature verification failed");
                ValidationError::InvalidSignature
            }
        })
}

/// Claim checks are done by [`TokenValidator::validate`] so each failure maps
/// to its own error and runs in a fixed order.
fn relax_claim_checks(validation: &mut Validation) {
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
}
