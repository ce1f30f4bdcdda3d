use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::credentials::errors::CredentialError;
use crate::domain::credentials::models::LoginCommand;
use crate::domain::credentials::ports::LoginOutcome;
use crate::domain::credentials::ports::LoginServicePort;
use crate::domain::credentials::ports::UserDirectory;

/// Domain service implementation for login.
///
/// Looks the account up in the directory, then hands password verification
/// and token issuance to the shared [`Authenticator`].
pub struct LoginService<UD>
where
    UD: UserDirectory,
{
    directory: Arc<UD>,
    authenticator: Arc<Authenticator>,
}

impl<UD> LoginService<UD>
where
    UD: UserDirectory,
{
    pub fn new(directory: Arc<UD>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            directory,
            authenticator,
        }
    }
}

#[async_trait]
impl<UD> LoginServicePort for LoginService<UD>
where
    UD: UserDirectory,
{
    async fn login(
        &self,
        command: LoginCommand,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, CredentialError> {
        let user = self.directory.find_by_username(&command.username).await?;
        let authenticator = Arc::clone(&self.authenticator);

        // Argon2 is CPU bound, keep it off the async workers
        let result = tokio::task::spawn_blocking(move || match user {
            None => {
                PasswordHasher::new().verify_decoy(&command.password);
                Err(CredentialError::InvalidCredentials)
            }
            Some(user) => authenticator
                .authenticate(
                    &command.password,
                    &user.password_hash,
                    &user.id,
                    user.roles.iter().cloned(),
                    now,
                )
                .map(|token| LoginOutcome { user, token })
                .map_err(|e| match e {
                    AuthenticationError::InvalidCredentials => CredentialError::InvalidCredentials,
                    AuthenticationError::PasswordError(err) => CredentialError::Password(err),
                    AuthenticationError::IssueError(err) => CredentialError::Token(err),
                }),
        })
        .await
        .map_err(|e| CredentialError::Internal(e.to_string()))?;

        match &result {
            Ok(outcome) => tracing::info!(
                subject = %outcome.user.id,
                kid = %outcome.token.key_id,
                "Login succeeded"
            ),
            Err(e) => tracing::warn!(error = %e, "Login rejected"),
        }

        result
    }
}
