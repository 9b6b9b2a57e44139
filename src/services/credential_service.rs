//! Domain service for password credentials.
//!
//! Owns creation, replacement, verification and migration of the single
//! password hash each user has.

use thiserror::Error;

use crate::domain::events::PasswordUpdatedEvent;
use crate::domain::{Password, User, UserId};

/// Errors specific to credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No credential stored for user {0}")]
    NotFound(UserId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CredentialError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CredentialError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait CredentialService: Send + Sync {
    /// Stores the initial password hash of a newly created account.
    async fn create_password_hash(
        &self,
        user_id: UserId,
        password: &Password,
    ) -> Result<(), CredentialError>;

    /// Replaces the user's password hash and invalidates all of their
    /// sessions in the same transaction.
    async fn update_password_hash(
        &self,
        user: &User,
        password: &Password,
        initiator: &User,
    ) -> Result<PasswordUpdatedEvent, CredentialError>;

    /// Returns false when the user has no credential.
    async fn is_password_valid_for_user(
        &self,
        user_id: UserId,
        password: &Password,
    ) -> Result<bool, CredentialError>;

    /// Re-hashes with the configured method if the stored hash was made with
    /// another one. Returns whether a new hash was written.
    ///
    /// The password must already have been verified by the caller.
    async fn migrate_password_hash_if_outdated(
        &self,
        user_id: UserId,
        password: &Password,
    ) -> Result<bool, CredentialError>;

    /// Removes the user's credential. Returns whether one existed.
    async fn delete_password_hash(&self, user_id: UserId) -> Result<bool, CredentialError>;
}
