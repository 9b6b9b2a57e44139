use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, TransactionTrait};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::log::UserLogEntry;
use crate::domain::{PasswordHash, TagId, UserId};
use crate::entities::users;

pub mod migrator;
pub mod repositories;

pub use repositories::credential::Credential;
pub use repositories::identity_tag::IdentityTag;
pub use repositories::session::SessionToken;
pub use repositories::verification_token::{Purpose, VerificationToken};

const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    /// Fresh private database, used by tests and dry runs.
    pub async fn in_memory() -> Result<Self> {
        // Every SQLite memory connection is its own database, so the pool
        // must never grow past one.
        Self::with_pool_options(MEMORY_URL, 1, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        let path_str = path_str.split('?').next().unwrap_or(path_str);
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !path_str.starts_with(":memory:") {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn credential_repo(&self) -> repositories::credential::CredentialRepository {
        repositories::credential::CredentialRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn identity_tag_repo(&self) -> repositories::identity_tag::IdentityTagRepository {
        repositories::identity_tag::IdentityTagRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn user_log_repo(&self) -> repositories::user_log::UserLogRepository {
        repositories::user_log::UserLogRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn authz_repo(&self) -> repositories::authz::AuthzRepository {
        repositories::authz::AuthzRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn consent_repo(&self) -> repositories::consent::ConsentRepository {
        repositories::consent::ConsentRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn verification_token_repo(
        &self,
    ) -> repositories::verification_token::VerificationTokenRepository {
        repositories::verification_token::VerificationTokenRepository::new(self.conn.clone())
    }

    // ========== Transactional Operations ==========

    /// Replace the user's password hash, drop all of their session tokens
    /// and write the log entry, all or nothing.
    pub async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &PasswordHash,
        log_entry: &UserLogEntry,
    ) -> Result<u64> {
        let txn = self.conn.begin().await?;

        repositories::credential::upsert(&txn, user_id, password_hash, log_entry.occurred_at)
            .await?;
        let revoked = repositories::session::delete_tokens_for_user(&txn, user_id).await?;
        repositories::user_log::insert_entry(&txn, log_entry).await?;

        txn.commit().await?;

        Ok(revoked)
    }

    /// Get or create the session token, write the login log entry and
    /// remember the login time in one transaction.
    pub async fn record_login(
        &self,
        user_id: UserId,
        log_entry: &UserLogEntry,
    ) -> Result<SessionToken> {
        let txn = self.conn.begin().await?;

        let token = repositories::session::get_or_create_token(&txn, user_id).await?;
        repositories::user_log::insert_entry(&txn, log_entry).await?;
        repositories::session::record_recent_login(&txn, user_id, log_entry.occurred_at).await?;

        txn.commit().await?;

        Ok(token)
    }

    pub async fn create_identity_tag(
        &self,
        tag: &IdentityTag,
        log_entry: &UserLogEntry,
    ) -> Result<()> {
        let txn = self.conn.begin().await?;

        repositories::identity_tag::insert(&txn, tag).await?;
        repositories::user_log::insert_entry(&txn, log_entry).await?;

        txn.commit().await?;

        Ok(())
    }

    pub async fn delete_identity_tag(&self, tag_id: TagId, log_entry: &UserLogEntry) -> Result<u64> {
        let txn = self.conn.begin().await?;

        let deleted = repositories::identity_tag::delete(&txn, tag_id).await?;
        if deleted == 0 {
            txn.rollback().await?;
            return Ok(0);
        }

        repositories::user_log::insert_entry(&txn, log_entry).await?;

        txn.commit().await?;

        Ok(deleted)
    }

    /// Flag the account as deleted and remove its credential and session
    /// tokens.
    pub async fn mark_user_deleted(&self, user_id: UserId) -> Result<()> {
        let txn = self.conn.begin().await?;

        repositories::user::set_flag(&txn, user_id, users::Column::Deleted, true).await?;
        repositories::credential::delete_for_user(&txn, user_id).await?;
        repositories::session::delete_tokens_for_user(&txn, user_id).await?;

        txn.commit().await?;

        Ok(())
    }

    pub async fn delete_login_entries(&self, occurred_before: DateTime<Utc>) -> Result<u64> {
        self.user_log_repo()
            .delete_login_entries(occurred_before)
            .await
    }
}
