use anyhow::Result;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::db::Store;
use crate::domain::{User, UserId};

/// Minimal user directory: account lookup and state flags.
#[derive(Clone)]
pub struct UserDirectory {
    store: Store,
}

impl UserDirectory {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create an account. It cannot log in until it is initialized.
    pub async fn create_user(&self, screen_name: &str, email_address: Option<&str>) -> Result<User> {
        let user = self.store.user_repo().create(screen_name, email_address).await?;
        info!(user_id = %user.id, screen_name, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.store.user_repo().get_by_id(user_id).await
    }

    pub async fn find_user_by_screen_name(&self, screen_name: &str) -> Result<Option<User>> {
        self.store.user_repo().find_by_screen_name(screen_name).await
    }

    pub async fn find_user_by_email_address(&self, email_address: &str) -> Result<Option<User>> {
        self.store
            .user_repo()
            .find_by_email_address(email_address)
            .await
    }

    pub async fn get_users_indexed_by_id(
        &self,
        user_ids: &HashSet<UserId>,
    ) -> Result<HashMap<UserId, User>> {
        self.store.user_repo().get_indexed_by_id(user_ids).await
    }

    pub async fn initialize_user(&self, user_id: UserId) -> Result<()> {
        self.store.user_repo().set_initialized(user_id, true).await?;
        info!(user_id = %user_id, "User initialized");
        Ok(())
    }

    /// Suspends the account. Existing session tokens stay valid.
    pub async fn suspend_user(&self, user_id: UserId) -> Result<()> {
        self.store.user_repo().set_suspended(user_id, true).await?;
        info!(user_id = %user_id, "User suspended");
        Ok(())
    }

    pub async fn unsuspend_user(&self, user_id: UserId) -> Result<()> {
        self.store.user_repo().set_suspended(user_id, false).await?;
        info!(user_id = %user_id, "User unsuspended");
        Ok(())
    }

    /// Flags the account as deleted and drops its credential and sessions.
    pub async fn mark_user_deleted(&self, user_id: UserId) -> Result<()> {
        self.store.mark_user_deleted(user_id).await?;
        info!(user_id = %user_id, "User marked as deleted");
        Ok(())
    }
}
