//! Token authentication core for the ordering API
//!
//! Provides the pieces that gate every protected request:
//! - Token configuration validated once at startup
//! - Access token issuance (HMAC or RSA signed JWTs)
//! - Access token validation yielding a per-request identity
//! - Signing key rotation with a grace window
//! - Password hashing (Argon2id) for the login flow
//!
//! # Examples
//!
//! ## Issue and validate
//! ```
//! use std::sync::Arc;
//!
//! use auth::{KeyAlgorithm, KeyRing, KeyStore, SigningKey, TokenIssuer, TokenSettings, TokenValidator};
//! use chrono::Utc;
//!
//! let settings = Arc::new(TokenSettings::new("ordering-api", "ordering-client", 60, 300).unwrap());
//! let key = SigningKey::from_secret("primary", b"secret_key_at_least_32_bytes_long!", KeyAlgorithm::Hs256).unwrap();
//! let keys = KeyStore::new(KeyRing::signing(key));
//!
//! let issuer = TokenIssuer::new(Arc::clone(&settings), keys.clone());
//! let validator = TokenValidator::new(settings, keys);
//!
//! let now = Utc::now();
//! let token = issuer.issue("u42", ["Admin"], now).unwrap();
//! let identity = validator.validate(&token.access_token, now).unwrap();
//! assert_eq!(identity.subject, "u42");
//! assert!(identity.has_role("Admin"));
//! ```
//!
//! ## Login flow
//! ```
//! use auth::{Authenticator, KeyAlgorithm, KeyRing, KeyStore, SigningKey, TokenSettings};
//! use chrono::Utc;
//!
//! let settings = TokenSettings::new("ordering-api", "ordering-client", 60, 300).unwrap();
//! let key = SigningKey::from_secret("primary", b"secret_key_at_least_32_bytes_long!", KeyAlgorithm::Hs256).unwrap();
//! let auth = Authenticator::new(settings, KeyStore::new(KeyRing::signing(key)));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let token = auth.authenticate("password123", &hash, "u42", ["Admin"], Utc::now()).unwrap();
//! println!("Token: {}", token.access_token);
//! ```

pub mod authenticator;
pub mod config;
pub mod identity;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use config::ConfigError;
pub use config::JwtSettings;
pub use config::TokenSettings;
pub use identity::IdentityContext;
pub use jwt::IssueError;
pub use jwt::IssuedToken;
pub use jwt::KeyAlgorithm;
pub use jwt::KeyRing;
pub use jwt::KeyStatus;
pub use jwt::KeyStore;
pub use jwt::SigningKey;
pub use jwt::TokenClaims;
pub use jwt::TokenIssuer;
pub use jwt::TokenState;
pub use jwt::TokenValidator;
pub use jwt::ValidationError;
pub use jwt::VerificationKey;
pub use jwt::PUBLIC_MESSAGE;
pub use password::PasswordError;
pub use password::PasswordHasher;
