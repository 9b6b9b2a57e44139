use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{TagId, UserId};
use crate::entities::{identity_tags, prelude::*};

/// A physical token identifier registered for a user.
///
/// Presenting a tag is a claim of identity, not proof: tags can be cloned or
/// stolen just like passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityTag {
    pub id: TagId,
    pub created_at: DateTime<Utc>,
    pub creator_id: UserId,
    pub identifier: String,
    pub user_id: UserId,
    pub note: Option<String>,
    pub suspended: bool,
}

impl From<identity_tags::Model> for IdentityTag {
    fn from(model: identity_tags::Model) -> Self {
        Self {
            id: TagId::new(model.id),
            created_at: model.created_at,
            creator_id: UserId::new(model.creator_id),
            identifier: model.identifier,
            user_id: UserId::new(model.user_id),
            note: model.note,
            suspended: model.suspended,
        }
    }
}

/// Key under which identifiers are compared and indexed.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.to_lowercase()
}

pub struct IdentityTagRepository {
    conn: DatabaseConnection,
}

impl IdentityTagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, tag_id: TagId) -> Result<Option<IdentityTag>> {
        let tag = IdentityTags::find_by_id(tag_id.value())
            .one(&self.conn)
            .await
            .context("Failed to query identity tag")?;

        Ok(tag.map(IdentityTag::from))
    }

    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<IdentityTag>> {
        let tag = IdentityTags::find()
            .filter(identity_tags::Column::IdentifierNormalized.eq(normalize_identifier(identifier)))
            .one(&self.conn)
            .await
            .context("Failed to query identity tag by identifier")?;

        Ok(tag.map(IdentityTag::from))
    }

    pub async fn get_all(&self) -> Result<Vec<IdentityTag>> {
        let rows = IdentityTags::find()
            .order_by_asc(identity_tags::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query identity tags")?;

        Ok(rows.into_iter().map(IdentityTag::from).collect())
    }
}

/// Insert a tag. A duplicate identifier surfaces as a unique constraint
/// violation from the database.
pub async fn insert<C: ConnectionTrait>(conn: &C, tag: &IdentityTag) -> Result<()> {
    let active_model = identity_tags::ActiveModel {
        id: Set(tag.id.value()),
        created_at: Set(tag.created_at),
        creator_id: Set(tag.creator_id.value()),
        identifier: Set(tag.identifier.clone()),
        identifier_normalized: Set(normalize_identifier(&tag.identifier)),
        user_id: Set(tag.user_id.value()),
        note: Set(tag.note.clone()),
        suspended: Set(tag.suspended),
    };

    IdentityTags::insert(active_model)
        .exec_without_returning(conn)
        .await
        .with_context(|| format!("Failed to insert identity tag {}", tag.id))?;

    Ok(())
}

pub async fn delete<C: ConnectionTrait>(conn: &C, tag_id: TagId) -> Result<u64> {
    let result = IdentityTags::delete_by_id(tag_id.value())
        .exec(conn)
        .await
        .with_context(|| format!("Failed to delete identity tag {tag_id}"))?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_folds_case() {
        assert_eq!(normalize_identifier("AbC0042"), "abc0042");
        assert_eq!(normalize_identifier("0004283951"), "0004283951");
    }
}
