//! `SeaORM` implementation of the `CredentialService` trait.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tokio::task;
use tracing::{debug, info};

use crate::db::Store;
use crate::domain::events::{EventUser, PasswordUpdatedEvent};
use crate::domain::log::{EVENT_PASSWORD_UPDATED, UserLogEntry};
use crate::domain::{Password, PasswordHash, User, UserId};
use crate::services::credential_service::{CredentialError, CredentialService};
use crate::services::password::PasswordHasher;

pub struct SeaOrmCredentialService {
    store: Store,
    hasher: PasswordHasher,
}

impl SeaOrmCredentialService {
    #[must_use]
    pub const fn new(store: Store, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    async fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialError> {
        let hasher = self.hasher.clone();
        let password = password.duplicate();

        let hash = task::spawn_blocking(move || hasher.create_password_hash(&password))
            .await
            .context("Password hashing task panicked")??;

        Ok(hash)
    }
}

#[async_trait]
impl CredentialService for SeaOrmCredentialService {
    async fn create_password_hash(
        &self,
        user_id: UserId,
        password: &Password,
    ) -> Result<(), CredentialError> {
        let hash = self.hash(password).await?;

        self.store
            .credential_repo()
            .save(user_id, &hash, Utc::now())
            .await?;

        debug!(user_id = %user_id, "Password hash created");
        Ok(())
    }

    async fn update_password_hash(
        &self,
        user: &User,
        password: &Password,
        initiator: &User,
    ) -> Result<PasswordUpdatedEvent, CredentialError> {
        let hash = self.hash(password).await?;
        let occurred_at = Utc::now();

        let log_entry = UserLogEntry::new(EVENT_PASSWORD_UPDATED, user.id, occurred_at)
            .with_initiator(initiator.id)
            .with_data("initiator_id", initiator.id.to_string());

        let revoked = self
            .store
            .update_password_hash(user.id, &hash, &log_entry)
            .await?;

        info!(
            user_id = %user.id,
            initiator_id = %initiator.id,
            revoked_sessions = revoked,
            "Password updated"
        );

        Ok(PasswordUpdatedEvent {
            occurred_at,
            initiator: EventUser::from_user(initiator),
            user: EventUser::from_user(user),
        })
    }

    async fn is_password_valid_for_user(
        &self,
        user_id: UserId,
        password: &Password,
    ) -> Result<bool, CredentialError> {
        let credential = self.store.credential_repo().find_for_user(user_id).await?;

        let Some(credential) = credential else {
            return Ok(false);
        };

        let hasher = self.hasher.clone();
        let password = password.duplicate();

        let is_valid = task::spawn_blocking(move || {
            hasher.check_password_hash(Some(&credential.password_hash), &password)
        })
        .await
        .context("Password verification task panicked")?;

        Ok(is_valid)
    }

    async fn migrate_password_hash_if_outdated(
        &self,
        user_id: UserId,
        password: &Password,
    ) -> Result<bool, CredentialError> {
        let credential = self
            .store
            .credential_repo()
            .find_for_user(user_id)
            .await?
            .ok_or(CredentialError::NotFound(user_id))?;

        if !self.hasher.is_recognized(&credential.password_hash)
            || self.hasher.is_password_hash_current(&credential.password_hash)
        {
            return Ok(false);
        }

        let hash = self.hash(password).await?;

        self.store
            .credential_repo()
            .save(user_id, &hash, Utc::now())
            .await?;

        info!(
            user_id = %user_id,
            method = %self.hasher.method(),
            "Migrated outdated password hash"
        );
        Ok(true)
    }

    async fn delete_password_hash(&self, user_id: UserId) -> Result<bool, CredentialError> {
        let deleted = self.store.credential_repo().delete_for_user(user_id).await?;
        Ok(deleted)
    }
}
