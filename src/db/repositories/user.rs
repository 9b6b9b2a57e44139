use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::domain::{User, UserId};
use crate::entities::{prelude::*, users};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            created_at: model.created_at,
            screen_name: model.screen_name,
            email_address: model.email_address,
            initialized: model.initialized,
            suspended: model.suspended,
            deleted: model.deleted,
            locale: model.locale,
        }
    }
}

/// Case folding for screen names and email addresses. SQLite's `lower()`
/// only folds ASCII, so it must not be used on these columns.
#[must_use]
pub fn normalize_login_name(value: &str) -> String {
    value.to_lowercase()
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create an uninitialized user account
    pub async fn create(&self, screen_name: &str, email_address: Option<&str>) -> Result<User> {
        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            screen_name: Set(screen_name.to_string()),
            screen_name_normalized: Set(normalize_login_name(screen_name)),
            email_address: Set(email_address.map(std::string::ToString::to_string)),
            email_address_normalized: Set(email_address.map(normalize_login_name)),
            initialized: Set(false),
            suspended: Set(false),
            deleted: Set(false),
            locale: Set(None),
        };

        let model = model
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to create user {screen_name}"))?;

        Ok(User::from(model))
    }

    pub async fn get_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let user = Users::find_by_id(user_id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get user by screen name, ignoring case
    pub async fn find_by_screen_name(&self, screen_name: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::ScreenNameNormalized.eq(normalize_login_name(screen_name)))
            .one(&self.conn)
            .await
            .context("Failed to query user by screen name")?;

        Ok(user.map(User::from))
    }

    /// Get user by email address, ignoring case
    pub async fn find_by_email_address(&self, email_address: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(
                users::Column::EmailAddressNormalized.eq(normalize_login_name(email_address)),
            )
            .one(&self.conn)
            .await
            .context("Failed to query user by email address")?;

        Ok(user.map(User::from))
    }

    /// Fetch several users at once, keyed by ID
    pub async fn get_indexed_by_id(&self, user_ids: &HashSet<UserId>) -> Result<HashMap<UserId, User>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Users::find()
            .filter(users::Column::Id.is_in(user_ids.iter().map(UserId::value)))
            .all(&self.conn)
            .await
            .context("Failed to query users by IDs")?;

        Ok(rows
            .into_iter()
            .map(|model| {
                let user = User::from(model);
                (user.id, user)
            })
            .collect())
    }

    pub async fn set_initialized(&self, user_id: UserId, initialized: bool) -> Result<()> {
        set_flag(&self.conn, user_id, users::Column::Initialized, initialized).await
    }

    pub async fn set_suspended(&self, user_id: UserId, suspended: bool) -> Result<()> {
        set_flag(&self.conn, user_id, users::Column::Suspended, suspended).await
    }
}

/// Set one of the account state flags on a user.
pub async fn set_flag<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    column: users::Column,
    value: bool,
) -> Result<()> {
    let result = Users::update_many()
        .col_expr(column, Expr::value(value))
        .filter(users::Column::Id.eq(user_id.value()))
        .exec(conn)
        .await
        .context("Failed to update user flag")?;

    if result.rows_affected == 0 {
        anyhow::bail!("User not found: {user_id}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_folds_non_ascii_letters() {
        assert_eq!(normalize_login_name("Élodie"), "élodie");
        assert_eq!(normalize_login_name("ÖMER@Example.COM"), "ömer@example.com");
    }
}
