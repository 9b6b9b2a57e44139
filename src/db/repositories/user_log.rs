use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

use crate::domain::UserId;
use crate::domain::log::{LOGIN_EVENT_TYPES, UserLogEntry};
use crate::entities::{prelude::*, user_log_entries};

impl From<user_log_entries::Model> for UserLogEntry {
    fn from(model: user_log_entries::Model) -> Self {
        let data = match model.data {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Self {
            id: model.id,
            occurred_at: model.occurred_at,
            event_type: model.event_type,
            user_id: UserId::new(model.user_id),
            initiator_id: model.initiator_id.map(UserId::new),
            data,
        }
    }
}

pub struct UserLogRepository {
    conn: DatabaseConnection,
}

impl UserLogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, entry: &UserLogEntry) -> Result<()> {
        insert_entry(&self.conn, entry).await
    }

    pub async fn get_for_user(&self, user_id: UserId) -> Result<Vec<UserLogEntry>> {
        let rows = UserLogEntries::find()
            .filter(user_log_entries::Column::UserId.eq(user_id.value()))
            .order_by_asc(user_log_entries::Column::OccurredAt)
            .all(&self.conn)
            .await
            .context("Failed to query user log entries")?;

        Ok(rows.into_iter().map(UserLogEntry::from).collect())
    }

    pub async fn get_for_user_of_type(
        &self,
        user_id: UserId,
        event_type: &str,
    ) -> Result<Vec<UserLogEntry>> {
        let rows = UserLogEntries::find()
            .filter(user_log_entries::Column::UserId.eq(user_id.value()))
            .filter(user_log_entries::Column::EventType.eq(event_type))
            .order_by_asc(user_log_entries::Column::OccurredAt)
            .all(&self.conn)
            .await
            .context("Failed to query user log entries by type")?;

        Ok(rows.into_iter().map(UserLogEntry::from).collect())
    }

    /// Login timestamp and user ID for every login from the IP address, oldest first
    pub async fn find_logins_for_ip_address(
        &self,
        ip_address: &str,
    ) -> Result<Vec<(DateTime<Utc>, UserId)>> {
        // SQLite stores the JSON payload as text
        let rows = UserLogEntries::find()
            .filter(user_log_entries::Column::EventType.is_in(LOGIN_EVENT_TYPES))
            .filter(Expr::cust_with_values(
                "json_extract(data, '$.ip_address') = ?",
                [ip_address],
            ))
            .order_by_asc(user_log_entries::Column::OccurredAt)
            .all(&self.conn)
            .await
            .context("Failed to query logins for IP address")?;

        Ok(rows
            .into_iter()
            .map(|r| (r.occurred_at, UserId::new(r.user_id)))
            .collect())
    }

    /// Delete login entries older than the cutoff; the only deletion the log permits
    pub async fn delete_login_entries(&self, occurred_before: DateTime<Utc>) -> Result<u64> {
        let result = UserLogEntries::delete_many()
            .filter(user_log_entries::Column::EventType.is_in(LOGIN_EVENT_TYPES))
            .filter(user_log_entries::Column::OccurredAt.lt(occurred_before))
            .exec(&self.conn)
            .await
            .context("Failed to delete login entries")?;

        Ok(result.rows_affected)
    }
}

pub async fn insert_entry<C: ConnectionTrait>(conn: &C, entry: &UserLogEntry) -> Result<()> {
    let active_model = user_log_entries::ActiveModel {
        id: Set(entry.id),
        occurred_at: Set(entry.occurred_at),
        event_type: Set(entry.event_type.clone()),
        user_id: Set(entry.user_id.value()),
        initiator_id: Set(entry.initiator_id.map(|id| id.value())),
        data: Set(Value::Object(entry.data.clone())),
    };

    UserLogEntries::insert(active_model)
        .exec_without_returning(conn)
        .await
        .with_context(|| format!("Failed to write user log entry '{}'", entry.event_type))?;

    Ok(())
}
