//! Audit trail entries for security-relevant user events.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::UserId;

pub const EVENT_USER_LOGGED_IN: &str = "user-logged-in";
pub const EVENT_USER_LOGGED_IN_TO_ADMIN: &str = "user-logged-in-to-admin";
pub const EVENT_USER_LOGGED_IN_TO_SITE: &str = "user-logged-in-to-site";
pub const EVENT_PASSWORD_UPDATED: &str = "password-updated";
pub const EVENT_IDENTITY_TAG_CREATED: &str = "user-identity-tag-created";
pub const EVENT_IDENTITY_TAG_DELETED: &str = "user-identity-tag-deleted";

/// Event types that record a successful login, including the legacy
/// surface-less one.
pub const LOGIN_EVENT_TYPES: [&str; 3] = [
    EVENT_USER_LOGGED_IN,
    EVENT_USER_LOGGED_IN_TO_ADMIN,
    EVENT_USER_LOGGED_IN_TO_SITE,
];

/// An immutable user log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLogEntry {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event_type: String,
    pub user_id: UserId,
    pub initiator_id: Option<UserId>,
    pub data: Map<String, Value>,
}

impl UserLogEntry {
    /// Builds a system-triggered entry; attach an actor with [`Self::with_initiator`].
    #[must_use]
    pub fn new(event_type: &str, user_id: UserId, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at,
            event_type: event_type.to_string(),
            user_id,
            initiator_id: None,
            data: Map::new(),
        }
    }

    #[must_use]
    pub fn with_initiator(mut self, initiator_id: UserId) -> Self {
        self.initiator_id = Some(initiator_id);
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_initiator_and_data() {
        let user_id = UserId::generate();
        let initiator_id = UserId::generate();

        let entry = UserLogEntry::new(EVENT_PASSWORD_UPDATED, user_id, Utc::now())
            .with_initiator(initiator_id)
            .with_data("initiator_id", initiator_id.to_string());

        assert_eq!(entry.user_id, user_id);
        assert_eq!(entry.initiator_id, Some(initiator_id));
        assert_eq!(
            entry.data.get("initiator_id"),
            Some(&Value::String(initiator_id.to_string()))
        );
    }

    #[test]
    fn system_entries_have_no_initiator() {
        let entry = UserLogEntry::new(EVENT_USER_LOGGED_IN_TO_SITE, UserId::generate(), Utc::now());
        assert!(entry.initiator_id.is_none());
        assert!(entry.data.is_empty());
    }
}
