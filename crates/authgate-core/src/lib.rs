//! authgate Core - Domain models, configuration and credential storage
//!
//! This crate defines the pieces of the gateway that do not depend on HTTP:
//! - User records and the signup insertion payload
//! - The `CredentialStore` contract and its PostgreSQL / in-memory backends
//! - Configuration management

pub mod config;
pub mod store;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use store::{
    CredentialStore, MemoryCredentialStore, PgCredentialStore, StoreError, StoreResult,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// User Models
// ============================================================================

/// A registered user as held by the credential store
///
/// Records are created only through signup and never mutated afterwards.
/// `username` and `email` are each unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque identifier assigned at insertion
    pub id: Uuid,

    /// Display name, unique
    pub username: String,

    /// Login identifier, unique
    pub email: String,

    /// PHC-formatted password hash
    pub password_hash: String,
}

/// Payload for inserting a new user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Materialize the record with a freshly assigned identifier
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
        }
    }

    /// Whether this payload would collide with an existing record
    pub fn collides_with(&self, record: &UserRecord) -> bool {
        record.username == self.username || record.email == self.email
    }
}
