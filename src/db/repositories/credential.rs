use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{PasswordHash, UserId};
use crate::entities::{credentials, prelude::*};

/// Stored password credential of a user
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: UserId,
    pub password_hash: PasswordHash,
    pub updated_at: DateTime<Utc>,
}

impl From<credentials::Model> for Credential {
    fn from(model: credentials::Model) -> Self {
        Self {
            user_id: UserId::new(model.user_id),
            password_hash: PasswordHash::new(model.password_hash),
            updated_at: model.updated_at,
        }
    }
}

pub struct CredentialRepository {
    conn: DatabaseConnection,
}

impl CredentialRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_for_user(&self, user_id: UserId) -> Result<Option<Credential>> {
        let credential = Credentials::find_by_id(user_id.value())
            .one(&self.conn)
            .await
            .context("Failed to query credential")?;

        Ok(credential.map(Credential::from))
    }

    pub async fn save(
        &self,
        user_id: UserId,
        password_hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        upsert(&self.conn, user_id, password_hash, updated_at).await
    }

    /// Delete the user's credential; returns whether one existed
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<bool> {
        delete_for_user(&self.conn, user_id).await
    }
}

/// Insert the credential, or replace hash and timestamp if the user already has one.
pub async fn upsert<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
    password_hash: &PasswordHash,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    let active_model = credentials::ActiveModel {
        user_id: Set(user_id.value()),
        password_hash: Set(password_hash.expose().to_string()),
        updated_at: Set(updated_at),
    };

    Credentials::insert(active_model)
        .on_conflict(
            OnConflict::column(credentials::Column::UserId)
                .update_columns([
                    credentials::Column::PasswordHash,
                    credentials::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .context("Failed to store credential")?;

    Ok(())
}

pub async fn delete_for_user<C: ConnectionTrait>(conn: &C, user_id: UserId) -> Result<bool> {
    let result = Credentials::delete_many()
        .filter(credentials::Column::UserId.eq(user_id.value()))
        .exec(conn)
        .await
        .context("Failed to delete credential")?;

    Ok(result.rows_affected > 0)
}
