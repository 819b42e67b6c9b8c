//! In-memory credential store for development and tests

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, StoreResult};
use crate::{NewUser, UserRecord};

/// Credential store held in process memory
///
/// Insertion checks for collisions and writes under the same write lock.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Vec<UserRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn insert_if_absent(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| user.collides_with(existing)) {
            return Err(StoreError::Conflict);
        }

        let record = user.into_record();
        users.push(record.clone());
        Ok(record)
    }
}
