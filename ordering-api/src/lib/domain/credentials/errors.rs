use auth::IssueError;
use auth::PasswordError;
use thiserror::Error;

/// Error for credential authentication.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Duplicate username in user directory: {0}")]
    DuplicateUsername(String),

    #[error("User directory error: {0}")]
    DirectoryError(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] IssueError),
}
