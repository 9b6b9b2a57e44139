use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::db::Store;
use crate::domain::UserId;
use crate::domain::log::UserLogEntry;

/// Append-only audit trail of security-relevant user events.
///
/// Entries are never updated. The only deletion is the retention cleanup of
/// login entries.
#[derive(Clone)]
pub struct UserLogService {
    store: Store,
}

impl UserLogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_entry(&self, entry: &UserLogEntry) -> Result<()> {
        self.store.user_log_repo().add(entry).await
    }

    /// All entries for the user, oldest first
    pub async fn get_entries_for_user(&self, user_id: UserId) -> Result<Vec<UserLogEntry>> {
        self.store.user_log_repo().get_for_user(user_id).await
    }

    pub async fn get_entries_for_user_of_type(
        &self,
        user_id: UserId,
        event_type: &str,
    ) -> Result<Vec<UserLogEntry>> {
        self.store
            .user_log_repo()
            .get_for_user_of_type(user_id, event_type)
            .await
    }

    pub async fn find_logins_for_ip_address(
        &self,
        ip_address: &str,
    ) -> Result<Vec<(DateTime<Utc>, UserId)>> {
        self.store
            .user_log_repo()
            .find_logins_for_ip_address(ip_address)
            .await
    }

    pub async fn delete_login_entries(&self, occurred_before: DateTime<Utc>) -> Result<u64> {
        self.store.delete_login_entries(occurred_before).await
    }
}
