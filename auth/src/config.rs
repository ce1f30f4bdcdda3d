use std::fmt;

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::jwt::keys::KeyAlgorithm;
use crate::jwt::keys::SigningKey;

/// Longest access-token lifetime accepted from configuration (7 days).
const MAX_EXPIRY_MINUTES: i64 = 7 * 24 * 60;

/// Longest time a retired key may keep verifying tokens (30 days).
const MAX_ROTATION_GRACE_MINUTES: i64 = 30 * 24 * 60;

/// Error raised while validating token configuration at startup.
///
/// Never surfaced per request: a process holding one of these must refuse to
/// serve authenticated routes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration value: {0}")]
    MissingValue(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

/// Raw JWT settings as loaded from configuration files and environment.
///
/// Nothing here is trusted until [`JwtSettings::into_parts`] has validated it.
#[derive(Deserialize, Clone)]
pub struct JwtSettings {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub expiry_minutes: Option<i64>,
    #[serde(default = "default_clock_skew_seconds")]
    pub clock_skew_seconds: i64,
    #[serde(default)]
    pub algorithm: KeyAlgorithm,
    #[serde(default = "default_key_id")]
    pub key_id: String,
    #[serde(default)]
    pub private_key_pem: Option<String>,
    #[serde(default)]
    pub public_key_pem: Option<String>,
    #[serde(default)]
    pub rotation_grace_minutes: Option<i64>,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_minutes", &self.expiry_minutes)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field(
                "private_key_pem",
                &self.private_key_pem.as_ref().map(|_| "<redacted>"),
            )
            .field("public_key_pem", &self.public_key_pem)
            .field("rotation_grace_minutes", &self.rotation_grace_minutes)
            .finish()
    }
}

fn default_clock_skew_seconds() -> i64 {
    300
}

fn default_key_id() -> String {
    "primary".to_string()
}

impl JwtSettings {
    /// Validate the settings and build the signing key they describe.
    ///
    /// # Returns
    /// Validated token settings and the active signing key
    ///
    /// # Errors
    /// * `MissingValue` - A required value is absent or empty
    /// * `InvalidValue` - A value is out of range
    /// * `InvalidKey` - Key material is missing, too short, or not parseable
    pub fn into_parts(self) -> Result<(TokenSettings, SigningKey), ConfigError> {
        let expiry_minutes = self
            .expiry_minutes
            .ok_or(ConfigError::MissingValue("jwt.expiry_minutes"))?;

        let mut settings = TokenSettings::new(
            &self.issuer,
            &self.audience,
            expiry_minutes,
            self.clock_skew_seconds,
        )?;
        if let Some(grace) = self.rotation_grace_minutes {
            settings = settings.with_rotation_grace(grace)?;
        }

        let signing_key = if self.algorithm.is_symmetric() {
            let secret = self
                .key
                .filter(|key| !key.is_empty())
                .ok_or(ConfigError::MissingValue("jwt.key"))?;
            SigningKey::from_secret(&self.key_id, secret.as_bytes(), self.algorithm)?
        } else {
            let private_pem = self
                .private_key_pem
                .ok_or(ConfigError::MissingValue("jwt.private_key_pem"))?;
            let public_pem = self
                .public_key_pem
                .ok_or(ConfigError::MissingValue("jwt.public_key_pem"))?;
            SigningKey::from_rsa_pem(&self.key_id, private_pem.as_bytes(), public_pem.as_bytes())?
        };

        Ok((settings, signing_key))
    }
}

/// Validated, immutable token configuration shared by issuer and validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    issuer: String,
    audience: String,
    expiry: Duration,
    clock_skew: Duration,
    rotation_grace: Duration,
}

impl TokenSettings {
    /// Create validated token settings.
    ///
    /// # Arguments
    /// * `issuer` - Value of the `iss` claim
    /// * `audience` - Value of the `aud` claim
    /// * `expiry_minutes` - Access token lifetime
    /// * `clock_skew_seconds` - Tolerance applied on both ends of the lifetime window
    ///
    /// # Errors
    /// * `MissingValue` - Issuer or audience is empty
    /// * `InvalidValue` - Expiry or skew is out of range
    pub fn new(
        issuer: &str,
        audience: &str,
        expiry_minutes: i64,
        clock_skew_seconds: i64,
    ) -> Result<Self, ConfigError> {
        let issuer = issuer.trim();
        if issuer.is_empty() {
            return Err(ConfigError::MissingValue("jwt.issuer"));
        }

        let audience = audience.trim();
        if audience.is_empty() {
            return Err(ConfigError::MissingValue("jwt.audience"));
        }

        if expiry_minutes <= 0 || expiry_minutes > MAX_EXPIRY_MINUTES {
            return Err(ConfigError::InvalidValue {
                field: "jwt.expiry_minutes",
                reason: format!(
                    "must be between 1 and {}, got {}",
                    MAX_EXPIRY_MINUTES, expiry_minutes
                ),
            });
        }
        let expiry = Duration::minutes(expiry_minutes);

        if clock_skew_seconds <= 0 || clock_skew_seconds > expiry.num_seconds() {
            return Err(ConfigError::InvalidValue {
                field: "jwt.clock_skew_seconds",
                reason: format!(
                    "must be positive and at most the token lifetime ({}s), got {}",
                    expiry.num_seconds(),
                    clock_skew_seconds
                ),
            });
        }
        let clock_skew = Duration::seconds(clock_skew_seconds);

        Ok(Self {
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            expiry,
            clock_skew,
            rotation_grace: expiry + clock_skew,
        })
    }

    /// Override how long a retired key keeps verifying tokens after rotation.
    ///
    /// # Errors
    /// * `InvalidValue` - Grace is negative or longer than 30 days
    pub fn with_rotation_grace(mut self, minutes: i64) -> Result<Self, ConfigError> {
        if !(0..=MAX_ROTATION_GRACE_MINUTES).contains(&minutes) {
            return Err(ConfigError::InvalidValue {
                field: "jwt.rotation_grace_minutes",
                reason: format!(
                    "must be between 0 and {}, got {}",
                    MAX_ROTATION_GRACE_MINUTES, minutes
                ),
            });
        }
        self.rotation_grace = Duration::minutes(minutes);
        Ok(self)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    pub fn rotation_grace(&self) -> Duration {
        self.rotation_grace
    }
}
