use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::credentials::errors::CredentialError;
use crate::domain::credentials::models::normalize_username;
use crate::domain::credentials::models::UserRecord;
use crate::domain::credentials::ports::UserDirectory;

/// User directory seeded from configuration at startup.
pub struct InMemoryUserDirectory {
    users: HashMap<String, UserRecord>,
}

impl InMemoryUserDirectory {
    /// Build the directory, keyed by normalized username.
    ///
    /// # Errors
    /// * `DuplicateUsername` - Two records normalize to the same username
    /// * `DirectoryError` - A record has an empty id or username
    pub fn new(records: Vec<UserRecord>) -> Result<Self, CredentialError> {
        let mut users = HashMap::with_capacity(records.len());

        for record in records {
            let username = normalize_username(&record.username);
            if username.is_empty() || record.id.trim().is_empty() {
                return Err(CredentialError::DirectoryError(
                    "user records need a non-empty id and username".to_string(),
                ));
            }
            if users.contains_key(&username) {
                return Err(CredentialError::DuplicateUsername(username));
            }
            users.insert(username, record);
        }

        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, CredentialError> {
        Ok(self.users.get(&normalize_username(username)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, username: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            roles: vec!["Clerk".to_string()],
        }
    }

    #[tokio::test]
    async fn test_find_by_username_is_case_insensitive() {
        let directory = InMemoryUserDirectory::new(vec![record("u1", "Alice")]).unwrap();

        let found = directory.find_by_username("alice").await.unwrap();
        assert_eq!(found.unwrap().id, "u1");

        let found = directory.find_by_username("  ALICE ").await.unwrap();
        assert_eq!(found.unwrap().id, "u1");

        assert!(directory.find_by_username("bob").await.unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let result = InMemoryUserDirectory::new(vec![record("u1", "alice"), record("u2", "ALICE")]);
        assert!(matches!(
            result,
            Err(CredentialError::DuplicateUsername(name)) if name == "alice"
        ));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = InMemoryUserDirectory::new(vec![record(" ", "alice")]);
        assert!(matches!(result, Err(CredentialError::DirectoryError(_))));
    }
}
