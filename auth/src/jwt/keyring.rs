use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Serialize;

use super::keys::SigningKey;
use super::keys::VerificationKey;
use crate::config::ConfigError;

/// A verification key and how long it is still trusted.
#[derive(Debug, Clone)]
struct TrustedKey {
    key: VerificationKey,
    /// `None` for the active key.
    accept_until: Option<DateTime<Utc>>,
}

impl TrustedKey {
    fn is_trusted_at(&self, now: DateTime<Utc>) -> bool {
        self.accept_until.map_or(true, |deadline| now <= deadline)
    }
}

/// Lifecycle status of a key, as reported by [`KeyRing::key_ids`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeyStatus {
    Active,
    Retired { accept_until: DateTime<Utc> },
}

/// Immutable snapshot of the keys in use.
///
/// The first trusted key is always the active one. A ring built with
/// [`KeyRing::signing`] can issue tokens; one built with
/// [`KeyRing::verifying`] can only validate them.
#[derive(Debug, Clone)]
pub struct KeyRing {
    signing: Option<SigningKey>,
    trusted: Vec<TrustedKey>,
}

impl KeyRing {
    /// Ring that signs with `key` and trusts its verification half.
    pub fn signing(key: SigningKey) -> Self {
        let active = TrustedKey {
            key: key.verification_key().clone(),
            accept_until: None,
        };
        Self {
            signing: Some(key),
            trusted: vec![active],
        }
    }

    /// Validator-only ring trusting `key`.
    pub fn verifying(key: VerificationKey) -> Self {
        Self {
            signing: None,
            trusted: vec![TrustedKey {
                key,
                accept_until: None,
            }],
        }
    }

    pub fn signing_key(&self) -> Option<&SigningKey> {
        self.signing.as_ref()
    }

    pub fn active_kid(&self) -> &str {
        self.trusted[0].key.kid()
    }

    /// Find the key that should verify a token.
    ///
    /// A token without `kid` is checked against the active key. Retired keys
    /// are only returned until their grace deadline.
    pub fn resolve(&self, kid: Option<&str>, now: DateTime<Utc>) -> Option<&VerificationKey> {
        let entry = match kid {
            None => self.trusted.first(),
            Some(kid) => self.trusted.iter().find(|entry| entry.key.kid() == kid),
        }?;

        entry.is_trusted_at(now).then_some(&entry.key)
    }

    pub fn key_ids(&self) -> Vec<(String, KeyStatus)> {
        self.trusted
            .iter()
            .map(|entry| {
                let status = match entry.accept_until {
                    None => KeyStatus::Active,
                    Some(accept_until) => KeyStatus::Retired { accept_until },
                };
                (entry.key.kid().to_string(), status)
            })
            .collect()
    }

    fn rotated(
        &self,
        signing: Option<SigningKey>,
        key: VerificationKey,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Self, ConfigError> {
        if self.trusted.iter().any(|entry| entry.key.kid() == key.kid()) {
            return Err(ConfigError::InvalidValue {
                field: "kid",
                reason: format!("key '{}' is already trusted", key.kid()),
            });
        }

        let deadline = now
            .checked_add_signed(grace)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "jwt.rotation_grace_minutes",
                reason: format!("grace of {}s is out of range", grace.num_seconds()),
            })?;

        let mut trusted = Vec::with_capacity(self.trusted.len() + 1);
        trusted.push(TrustedKey {
            key,
            accept_until: None,
        });
        for entry in &self.trusted {
            let retired = TrustedKey {
                key: entry.key.clone(),
                accept_until: Some(entry.accept_until.unwrap_or(deadline)),
            };
            if retired.is_trusted_at(now) {
                trusted.push(retired);
            }
        }

        Ok(Self { signing, trusted })
    }
}

/// Shared handle to the current [`KeyRing`].
///
/// Readers always get a complete snapshot; rotation swaps the whole ring.
#[derive(Clone)]
pub struct KeyStore {
    ring: Arc<ArcSwap<KeyRing>>,
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("ring", &*self.ring.load())
            .finish()
    }
}

impl KeyStore {
    pub fn new(ring: KeyRing) -> Self {
        Self {
            ring: Arc::new(ArcSwap::from_pointee(ring)),
        }
    }

    /// Current snapshot of the ring.
    pub fn load(&self) -> Arc<KeyRing> {
        self.ring.load_full()
    }

    /// Make `key` the active signing key.
    ///
    /// The previous active key keeps verifying tokens until `now + grace`;
    /// retired keys past their deadline are dropped.
    ///
    /// # Errors
    /// * `InvalidValue` - A key with the same id is already trusted, or
    ///   `now + grace` is out of range
    pub fn rotate(
        &self,
        key: SigningKey,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<(), ConfigError> {
        let verification = key.verification_key().clone();
        self.swap(|ring| ring.rotated(Some(key.clone()), verification.clone(), now, grace))?;

        tracing::info!(kid = %key.kid(), grace_seconds = grace.num_seconds(), "Signing key rotated");
        Ok(())
    }

    /// Make `key` the active verification key of a validator-only ring.
    ///
    /// # Errors
    /// * `InvalidValue` - A key with the same id is already trusted, or the
    ///   ring holds a signing key and must be rotated with [`KeyStore::rotate`]
    pub fn trust(
        &self,
        key: VerificationKey,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<(), ConfigError> {
        self.swap(|ring| {
            if ring.signing_key().is_some() {
                return Err(ConfigError::InvalidValue {
                    field: "kid",
                    reason: "signing rings are rotated with a signing key".to_string(),
                });
            }
            ring.rotated(None, key.clone(), now, grace)
        })?;

        tracing::info!(kid = %key.kid(), grace_seconds = grace.num_seconds(), "Verification key rotated");
        Ok(())
    }

    fn swap<F>(&self, mut next: F) -> Result<(), ConfigError>
    where
        F: FnMut(&KeyRing) -> Result<KeyRing, ConfigError>,
    {
        let mut outcome = Ok(());
        self.ring.rcu(|current| match next(&**current) {
            Ok(ring) => {
                outcome = Ok(());
                Arc::new(ring)
            }
            Err(e) => {
                outcome = Err(e);
                Arc::clone(current)
            }
        });
        outcome
    }
}
