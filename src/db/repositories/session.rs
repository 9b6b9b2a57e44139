use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::domain::UserId;
use crate::entities::{prelude::*, recent_logins, session_tokens};

/// Opaque bearer token bound to exactly one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: UserId,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl From<session_tokens::Model> for SessionToken {
    fn from(model: session_tokens::Model) -> Self {
        Self {
            user_id: UserId::new(model.user_id),
            token: model.token,
            created_at: model.created_at,
        }
    }
}

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_or_create_token(&self, user_id: UserId) -> Result<SessionToken> {
        get_or_create_token(&self.conn, user_id).await
    }

    pub async fn find_for_user(&self, user_id: UserId) -> Result<Option<SessionToken>> {
        let token = SessionTokens::find()
            .filter(session_tokens::Column::UserId.eq(user_id.value()))
            .one(&self.conn)
            .await
            .context("Failed to query session token")?;

        Ok(token.map(SessionToken::from))
    }

    /// Check that the token exists and belongs to exactly this user
    pub async fn is_token_valid_for_user(&self, token: &str, user_id: UserId) -> Result<bool> {
        let count = SessionTokens::find()
            .filter(session_tokens::Column::Token.eq(token))
            .filter(session_tokens::Column::UserId.eq(user_id.value()))
            .count(&self.conn)
            .await
            .context("Failed to check session token")?;

        Ok(count > 0)
    }

    pub async fn delete_for_user(&self, user_id: UserId) -> Result<u64> {
        delete_tokens_for_user(&self.conn, user_id).await
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let result = SessionTokens::delete_many()
            .exec(&self.conn)
            .await
            .context("Failed to delete session tokens")?;

        Ok(result.rows_affected)
    }

    pub async fn record_recent_login(&self, user_id: UserId, occurred_at: DateTime<Utc>) -> Result<()> {
        record_recent_login(&self.conn, user_id, occurred_at).await
    }

    pub async fn find_recent_login(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>> {
        let recent_login = RecentLogins::find_by_id(user_id.value())
            .one(&self.conn)
            .await
            .context("Failed to query recent login")?;

        Ok(recent_login.map(|r| r.occurred_at))
    }

    pub async fn find_recent_logins_for_users(
        &self,
        user_ids: &HashSet<UserId>,
    ) -> Result<HashMap<UserId, DateTime<Utc>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = RecentLogins::find()
            .filter(recent_logins::Column::UserId.is_in(user_ids.iter().map(UserId::value)))
            .all(&self.conn)
            .await
            .context("Failed to query recent logins")?;

        Ok(rows
            .into_iter()
            .map(|r| (UserId::new(r.user_id), r.occurred_at))
            .collect())
    }
}

/// Return the user's token, creating one if none exists.
///
/// The insert is a no-op on conflict so that concurrent callers all end up
/// reading the single winning row.
pub async fn get_or_create_token<C: ConnectionTrait>(conn: &C, user_id: UserId) -> Result<SessionToken> {
    let candidate = session_tokens::ActiveModel {
        token: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.value()),
        created_at: Set(Utc::now()),
    };

    SessionTokens::insert(candidate)
        .on_conflict(
            OnConflict::column(session_tokens::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .context("Failed to insert session token")?;

    let token = SessionTokens::find()
        .filter(session_tokens::Column::UserId.eq(user_id.value()))
        .one(conn)
        .await
        .context("Failed to query session token")?
        .ok_or_else(|| anyhow::anyhow!("Session token missing after insert for user {user_id}"))?;

    Ok(SessionToken::from(token))
}

pub async fn delete_tokens_for_user<C: ConnectionTrait>(conn: &C, user_id: UserId) -> Result<u64> {
    let result = SessionTokens::delete_many()
        .filter(session_tokens::Column::UserId.eq(user_id.value()))
        .exec(conn)
        .await
        .context("Failed to delete session tokens for user")?;

    Ok(result.rows_affected)
}

/// Overwrite the time of the user's most recent login.
pub async fn record_recent_login<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    occurred_at: DateTime<Utc>,
) -> Result<()> {
    let active_model = recent_logins::ActiveModel {
        user_id: Set(user_id.value()),
        occurred_at: Set(occurred_at),
    };

    RecentLogins::insert(active_model)
        .on_conflict(
            OnConflict::column(recent_logins::Column::UserId)
                .update_column(recent_logins::Column::OccurredAt)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .context("Failed to record recent login")?;

    Ok(())
}
