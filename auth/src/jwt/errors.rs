use thiserror::Error;

/// Message returned to clients for every validation failure.
///
/// The specific [`ValidationError`] is only ever logged.
pub const PUBLIC_MESSAGE: &str = "Invalid or expired token";

/// Error type for token issuance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssueError {
    #[error("Subject identifier must not be empty")]
    EmptySubject,

    #[error("No signing key configured")]
    NoSigningKey,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Request-scoped token validation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token issuer is invalid")]
    InvalidIssuer,

    #[error("Token audience is invalid")]
    InvalidAudience,

    #[error("Token is expired")]
    Expired,
}

/// State of a token as seen by one validator at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Valid,
    /// Permanent failure: structure, signature, issuer or audience.
    Invalid,
    /// Would have been valid at an earlier instant.
    Expired,
}

impl ValidationError {
    pub fn state(&self) -> TokenState {
        match self {
            ValidationError::Expired => TokenState::Expired,
            ValidationError::Malformed(_)
            | ValidationError::InvalidSignature
            | ValidationError::InvalidIssuer
            | ValidationError::InvalidAudience => TokenState::Invalid,
        }
    }

    /// Short machine-readable name, suitable for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Malformed(_) => "malformed",
            ValidationError::InvalidSignature => "invalid_signature",
            ValidationError::InvalidIssuer => "invalid_issuer",
            ValidationError::InvalidAudience => "invalid_audience",
            ValidationError::Expired => "expired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classification() {
        assert_eq!(ValidationError::Expired.state(), TokenState::Expired);
        assert_eq!(
            ValidationError::Malformed("bad".to_string()).state(),
            TokenState::Invalid
        );
        assert_eq!(ValidationError::InvalidSignature.state(), TokenState::Invalid);
        assert_eq!(ValidationError::InvalidIssuer.state(), TokenState::Invalid);
        assert_eq!(ValidationError::InvalidAudience.state(), TokenState::Invalid);
    }
}
