use serde::Deserialize;

/// Account known to the user directory.
///
/// Authentication of these credentials happens before any token is issued;
/// `id` becomes the token subject and `roles` its role claims.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Login request after basic shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl LoginCommand {
    /// Usernames are matched case-insensitively and without surrounding whitespace.
    pub fn new(username: &str, password: String) -> Self {
        Self {
            username: normalize_username(username),
            password,
        }
    }
}

pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
