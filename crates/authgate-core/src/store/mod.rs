//! Credential storage
//!
//! The gateway needs exactly two things from its user store: lookups by
//! identifier and an atomic insert that refuses duplicates. Both backends
//! below uphold the uniqueness of `username` and `email` inside
//! `insert_if_absent` itself, so two racing signups cannot both succeed.

mod memory;
mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

use crate::{NewUser, UserRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Username or email already taken
    #[error("Username or email already registered")]
    Conflict,

    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Lookup and insertion contract for user credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by email address
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Find any user holding either identifier
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<UserRecord>>;

    /// Insert a user unless the username or email is taken
    ///
    /// Returns `StoreError::Conflict` on collision. The check and the write
    /// are a single atomic step.
    async fn insert_if_absent(&self, user: NewUser) -> StoreResult<UserRecord>;
}
