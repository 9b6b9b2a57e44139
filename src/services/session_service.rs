//! Domain service for server-side session tokens.
//!
//! Each user has at most one token. It is created lazily on the first login,
//! reused by every later login and only removed on password change, account
//! deletion or explicit invalidation.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::db::SessionToken;
use crate::domain::{CurrentUser, SiteId, User, UserId};

/// Errors specific to session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SessionError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Where a login happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginSurface {
    Admin,
    Site(SiteId),
}

impl LoginSurface {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Site(_) => "site",
        }
    }
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Returns the user's token, creating it if the user has none yet.
    async fn get_session_token(&self, user_id: UserId) -> Result<SessionToken, SessionError>;

    async fn find_session_token_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<SessionToken>, SessionError>;

    /// True only if the token exists and was issued to exactly this user.
    async fn is_session_valid(&self, user_id: UserId, token: &str) -> Result<bool, SessionError>;

    async fn delete_session_tokens_for_user(&self, user_id: UserId) -> Result<u64, SessionError>;

    /// Invalidates every session of every user.
    async fn delete_all_session_tokens(&self) -> Result<u64, SessionError>;

    /// Gets or creates the token, writes the login log entry and records the
    /// login time, all in one transaction.
    async fn log_in_user(
        &self,
        user: &User,
        ip_address: Option<&str>,
        surface: &LoginSurface,
        occurred_at: DateTime<Utc>,
    ) -> Result<SessionToken, SessionError>;

    async fn find_recent_login(
        &self,
        user_id: UserId,
    ) -> Result<Option<DateTime<Utc>>, SessionError>;

    async fn find_recent_logins_for_users(
        &self,
        user_ids: &HashSet<UserId>,
    ) -> Result<HashMap<UserId, DateTime<Utc>>, SessionError>;

    /// Resolves the requesting user from the client session.
    ///
    /// Falls back to an anonymous user unless the session is valid and the
    /// account is initialized, unsuspended and undeleted.
    async fn resolve_current_user(
        &self,
        user_id: Option<UserId>,
        token: Option<&str>,
        locale: Option<String>,
    ) -> Result<CurrentUser, SessionError>;
}
