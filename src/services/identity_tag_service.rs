//! Domain service for identity tags.
//!
//! Tags map physical token identifiers (e.g. RFID) to users. Identifiers are
//! unique regardless of case.

use thiserror::Error;

use crate::db::IdentityTag;
use crate::domain::events::{UserIdentityTagCreatedEvent, UserIdentityTagDeletedEvent};
use crate::domain::{TagId, User};

/// Errors specific to identity tag operations.
#[derive(Debug, Error)]
pub enum IdentityTagError {
    #[error("Identifier is already taken: {0}")]
    IdentifierAlreadyTaken(String),

    #[error("Identity tag not found: {0}")]
    NotFound(TagId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for IdentityTagError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for IdentityTagError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A tag with its creator and user resolved.
#[derive(Debug, Clone)]
pub struct IdentityTagDetails {
    pub tag: IdentityTag,
    pub creator: User,
    pub user: User,
}

#[async_trait::async_trait]
pub trait IdentityTagService: Send + Sync {
    /// Registers a tag. The tag row and its log entry are written together.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityTagError::IdentifierAlreadyTaken`] if any tag
    /// already uses the identifier in any letter case.
    async fn create_tag(
        &self,
        creator: &User,
        identifier: &str,
        user: &User,
        note: Option<&str>,
        suspended: bool,
    ) -> Result<(IdentityTag, UserIdentityTagCreatedEvent), IdentityTagError>;

    /// # Errors
    ///
    /// Returns [`IdentityTagError::NotFound`] if the tag no longer exists.
    async fn delete_tag(
        &self,
        tag: &IdentityTag,
        initiator: &User,
    ) -> Result<UserIdentityTagDeletedEvent, IdentityTagError>;

    async fn find_tag(&self, tag_id: TagId) -> Result<Option<IdentityTag>, IdentityTagError>;

    /// Case-insensitive lookup for the point of presentation.
    async fn find_tag_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<IdentityTag>, IdentityTagError>;

    /// Like [`Self::find_tag_by_identifier`], with creator and user resolved.
    async fn find_tag_details_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<IdentityTagDetails>, IdentityTagError>;

    /// All tags with creators and users loaded in one batch.
    async fn get_all_tags(&self) -> Result<Vec<IdentityTagDetails>, IdentityTagError>;
}
