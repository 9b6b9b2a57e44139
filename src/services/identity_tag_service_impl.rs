//! `SeaORM` implementation of the `IdentityTagService` trait.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DbErr, SqlErr};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::db::{IdentityTag, Store};
use crate::domain::events::{
    EventUser, UserIdentityTagCreatedEvent, UserIdentityTagDeletedEvent,
};
use crate::domain::log::{EVENT_IDENTITY_TAG_CREATED, EVENT_IDENTITY_TAG_DELETED, UserLogEntry};
use crate::domain::{TagId, User, UserId};
use crate::services::identity_tag_service::{
    IdentityTagDetails, IdentityTagError, IdentityTagService,
};

pub struct SeaOrmIdentityTagService {
    store: Store,
}

impl SeaOrmIdentityTagService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn event_user(&self, user_id: UserId) -> Result<EventUser, IdentityTagError> {
        let user = self
            .store
            .user_repo()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| IdentityTagError::Internal(format!("User not found: {user_id}")))?;

        Ok(EventUser::from_user(&user))
    }

    /// Loads creators and users of all tags in one query.
    async fn resolve_details(
        &self,
        tags: Vec<IdentityTag>,
    ) -> Result<Vec<IdentityTagDetails>, IdentityTagError> {
        let user_ids: HashSet<UserId> = tags
            .iter()
            .flat_map(|tag| [tag.creator_id, tag.user_id])
            .collect();

        let users_by_id = self.store.user_repo().get_indexed_by_id(&user_ids).await?;

        tags.into_iter()
            .map(|tag| {
                let creator = users_by_id.get(&tag.creator_id).cloned().ok_or_else(|| {
                    IdentityTagError::Internal(format!("Creator not found: {}", tag.creator_id))
                })?;
                let user = users_by_id.get(&tag.user_id).cloned().ok_or_else(|| {
                    IdentityTagError::Internal(format!("User not found: {}", tag.user_id))
                })?;

                Ok(IdentityTagDetails { tag, creator, user })
            })
            .collect()
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}

fn tag_log_entry(event_type: &str, tag: &IdentityTag, initiator: &User) -> UserLogEntry {
    UserLogEntry::new(event_type, tag.user_id, Utc::now())
        .with_initiator(initiator.id)
        .with_data("tag_id", tag.id.to_string())
        .with_data("identifier", tag.identifier.as_str())
}

#[async_trait]
impl IdentityTagService for SeaOrmIdentityTagService {
    async fn create_tag(
        &self,
        creator: &User,
        identifier: &str,
        user: &User,
        note: Option<&str>,
        suspended: bool,
    ) -> Result<(IdentityTag, UserIdentityTagCreatedEvent), IdentityTagError> {
        let tag = IdentityTag {
            id: TagId::generate(),
            created_at: Utc::now(),
            creator_id: creator.id,
            identifier: identifier.to_string(),
            user_id: user.id,
            note: note.map(ToString::to_string),
            suspended,
        };

        let log_entry = tag_log_entry(EVENT_IDENTITY_TAG_CREATED, &tag, creator);

        if let Err(e) = self.store.create_identity_tag(&tag, &log_entry).await {
            if is_unique_violation(&e) {
                warn!(identifier, "Identity tag identifier already taken");
                return Err(IdentityTagError::IdentifierAlreadyTaken(
                    identifier.to_string(),
                ));
            }
            return Err(e.into());
        }

        info!(
            tag_id = %tag.id,
            user_id = %user.id,
            creator_id = %creator.id,
            "Identity tag created"
        );

        let event = UserIdentityTagCreatedEvent {
            occurred_at: tag.created_at,
            initiator: EventUser::from_user(creator),
            tag_id: tag.id,
            identifier: tag.identifier.clone(),
            user: EventUser::from_user(user),
        };

        Ok((tag, event))
    }

    async fn delete_tag(
        &self,
        tag: &IdentityTag,
        initiator: &User,
    ) -> Result<UserIdentityTagDeletedEvent, IdentityTagError> {
        let user = self.event_user(tag.user_id).await?;
        let log_entry = tag_log_entry(EVENT_IDENTITY_TAG_DELETED, tag, initiator);

        if self.store.delete_identity_tag(tag.id, &log_entry).await? == 0 {
            return Err(IdentityTagError::NotFound(tag.id));
        }

        info!(tag_id = %tag.id, initiator_id = %initiator.id, "Identity tag deleted");

        Ok(UserIdentityTagDeletedEvent {
            occurred_at: log_entry.occurred_at,
            initiator: EventUser::from_user(initiator),
            tag_id: tag.id,
            identifier: tag.identifier.clone(),
            user,
        })
    }

    async fn find_tag(&self, tag_id: TagId) -> Result<Option<IdentityTag>, IdentityTagError> {
        let tag = self.store.identity_tag_repo().find(tag_id).await?;
        Ok(tag)
    }

    async fn find_tag_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<IdentityTag>, IdentityTagError> {
        let tag = self
            .store
            .identity_tag_repo()
            .find_by_identifier(identifier)
            .await?;

        Ok(tag)
    }

    async fn find_tag_details_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<IdentityTagDetails>, IdentityTagError> {
        let Some(tag) = self.find_tag_by_identifier(identifier).await? else {
            return Ok(None);
        };

        let mut details = self.resolve_details(vec![tag]).await?;
        Ok(details.pop())
    }

    async fn get_all_tags(&self) -> Result<Vec<IdentityTagDetails>, IdentityTagError> {
        let tags = self.store.identity_tag_repo().get_all().await?;
        self.resolve_details(tags).await
    }
}
