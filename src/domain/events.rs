//! Domain events for security-relevant state changes.
//!
//! Every event is returned to the caller of the operation that produced it so
//! the host application can announce or forward it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Site, SiteId, TagId, User, UserId};

/// User reference embedded in events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventUser {
    pub id: UserId,
    pub screen_name: String,
}

impl EventUser {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            screen_name: user.screen_name.clone(),
        }
    }
}

/// Site reference embedded in events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventSite {
    pub id: SiteId,
    pub title: String,
}

impl EventSite {
    #[must_use]
    pub fn from_site(site: &Site) -> Self {
        Self {
            id: site.id.clone(),
            title: site.title.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserLoggedInToAdminEvent {
    pub occurred_at: DateTime<Utc>,
    pub initiator: EventUser,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserLoggedInToSiteEvent {
    pub occurred_at: DateTime<Utc>,
    pub initiator: EventUser,
    pub site: EventSite,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PasswordUpdatedEvent {
    pub occurred_at: DateTime<Utc>,
    pub initiator: EventUser,
    pub user: EventUser,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserIdentityTagCreatedEvent {
    pub occurred_at: DateTime<Utc>,
    pub initiator: EventUser,
    pub tag_id: TagId,
    pub identifier: String,
    pub user: EventUser,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserIdentityTagDeletedEvent {
    pub occurred_at: DateTime<Utc>,
    pub initiator: EventUser,
    pub tag_id: TagId,
    pub identifier: String,
    pub user: EventUser,
}

/// All authentication events, for consumers that handle them uniformly.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum AuthnEvent {
    UserLoggedInToAdmin(UserLoggedInToAdminEvent),
    UserLoggedInToSite(UserLoggedInToSiteEvent),
    PasswordUpdated(PasswordUpdatedEvent),
    UserIdentityTagCreated(UserIdentityTagCreatedEvent),
    UserIdentityTagDeleted(UserIdentityTagDeletedEvent),
}

impl From<UserLoggedInToAdminEvent> for AuthnEvent {
    fn from(event: UserLoggedInToAdminEvent) -> Self {
        Self::UserLoggedInToAdmin(event)
    }
}

impl From<UserLoggedInToSiteEvent> for AuthnEvent {
    fn from(event: UserLoggedInToSiteEvent) -> Self {
        Self::UserLoggedInToSite(event)
    }
}

impl From<PasswordUpdatedEvent> for AuthnEvent {
    fn from(event: PasswordUpdatedEvent) -> Self {
        Self::PasswordUpdated(event)
    }
}

impl From<UserIdentityTagCreatedEvent> for AuthnEvent {
    fn from(event: UserIdentityTagCreatedEvent) -> Self {
        Self::UserIdentityTagCreated(event)
    }
}

impl From<UserIdentityTagDeletedEvent> for AuthnEvent {
    fn from(event: UserIdentityTagDeletedEvent) -> Self {
        Self::UserIdentityTagDeleted(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[test]
    fn authn_event_serializes_with_type_tag() {
        let event = UserLoggedInToAdminEvent {
            occurred_at: Utc::now(),
            initiator: EventUser {
                id: UserId::generate(),
                screen_name: "Alice".to_string(),
            },
        };

        let json = serde_json::to_value(AuthnEvent::from(event)).unwrap();

        assert_eq!(json["type"], "UserLoggedInToAdmin");
        assert_eq!(json["payload"]["initiator"]["screen_name"], "Alice");
    }
}
