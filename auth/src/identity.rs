use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

/// Verified identity of the caller of a single request.
///
/// Rebuilt from the presented token on every request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityContext {
    pub subject: String,
    pub roles: BTreeSet<String>,
    pub expires_at: DateTime<Utc>,
    /// Key that verified the token
    pub key_id: String,
}

impl IdentityContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a str>) -> bool {
        roles.into_iter().any(|role| self.has_role(role))
    }
}
