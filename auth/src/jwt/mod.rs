pub mod claims;
pub mod errors;
pub mod issuer;
pub mod keyring;
pub mod keys;
pub mod validator;

pub use claims::TokenClaims;
pub use errors::IssueError;
pub use errors::TokenState;
pub use errors::ValidationError;
pub use errors::PUBLIC_MESSAGE;
pub use issuer::IssuedToken;
pub use issuer::TokenIssuer;
pub use keyring::KeyRing;
pub use keyring::KeyStatus;
pub use keyring::KeyStore;
pub use keys::KeyAlgorithm;
pub use keys::SigningKey;
pub use keys::VerificationKey;
pub use validator::TokenValidator;
