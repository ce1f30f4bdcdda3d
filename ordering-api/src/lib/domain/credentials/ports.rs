use async_trait::async_trait;
use auth::IssuedToken;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::credentials::errors::CredentialError;
use crate::domain::credentials::models::LoginCommand;
use crate::domain::credentials::models::UserRecord;

/// Outcome of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserRecord,
    pub token: IssuedToken,
}

/// Port for credential authentication.
#[async_trait]
pub trait LoginServicePort: Send + Sync + 'static {
    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `command` - Username and password presented by the client
    /// * `now` - Current time, used as the token issue time
    ///
    /// # Returns
    /// The authenticated user and its access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `DirectoryError` - User lookup failed
    /// * `Password` - Stored hash is unusable
    /// * `Token` - Token issuance failed
    async fn login(
        &self,
        command: LoginCommand,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, CredentialError>;
}

/// Lookup of accounts by username.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve an account by normalized username.
    ///
    /// # Returns
    /// Optional account (None if unknown)
    ///
    /// # Errors
    /// * `DirectoryError` - Lookup failed
    async fn find_by_username(&self, username: &str)
        -> Result<Option<UserRecord>, CredentialError>;
}
