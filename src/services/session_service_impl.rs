//! `SeaORM` implementation of the `SessionService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::db::{SessionToken, Store};
use crate::domain::log::{
    EVENT_USER_LOGGED_IN_TO_ADMIN, EVENT_USER_LOGGED_IN_TO_SITE, UserLogEntry,
};
use crate::domain::{CurrentUser, User, UserId};
use crate::services::session_service::{LoginSurface, SessionError, SessionService};

pub struct SeaOrmSessionService {
    store: Store,
}

impl SeaOrmSessionService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn login_log_entry(
    user: &User,
    ip_address: Option<&str>,
    surface: &LoginSurface,
    occurred_at: DateTime<Utc>,
) -> UserLogEntry {
    let event_type = match surface {
        LoginSurface::Admin => EVENT_USER_LOGGED_IN_TO_ADMIN,
        LoginSurface::Site(_) => EVENT_USER_LOGGED_IN_TO_SITE,
    };

    let mut entry = UserLogEntry::new(event_type, user.id, occurred_at).with_initiator(user.id);

    if let Some(ip_address) = ip_address {
        entry = entry.with_data("ip_address", ip_address);
    }

    if let LoginSurface::Site(site_id) = surface {
        entry = entry.with_data("site_id", site_id.as_str());
    }

    entry
}

#[async_trait]
impl SessionService for SeaOrmSessionService {
    async fn get_session_token(&self, user_id: UserId) -> Result<SessionToken, SessionError> {
        let token = self.store.session_repo().get_or_create_token(user_id).await?;
        Ok(token)
    }

    async fn find_session_token_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<SessionToken>, SessionError> {
        let token = self.store.session_repo().find_for_user(user_id).await?;
        Ok(token)
    }

    async fn is_session_valid(&self, user_id: UserId, token: &str) -> Result<bool, SessionError> {
        if token.is_empty() {
            return Ok(false);
        }

        let valid = self
            .store
            .session_repo()
            .is_token_valid_for_user(token, user_id)
            .await?;

        Ok(valid)
    }

    async fn delete_session_tokens_for_user(&self, user_id: UserId) -> Result<u64, SessionError> {
        let deleted = self.store.session_repo().delete_for_user(user_id).await?;
        debug!(user_id = %user_id, deleted, "Deleted session tokens for user");
        Ok(deleted)
    }

    async fn delete_all_session_tokens(&self) -> Result<u64, SessionError> {
        let deleted = self.store.session_repo().delete_all().await?;
        warn!(deleted, "Invalidated all session tokens");
        Ok(deleted)
    }

    async fn log_in_user(
        &self,
        user: &User,
        ip_address: Option<&str>,
        surface: &LoginSurface,
        occurred_at: DateTime<Utc>,
    ) -> Result<SessionToken, SessionError> {
        let log_entry = login_log_entry(user, ip_address, surface, occurred_at);

        let token = self.store.record_login(user.id, &log_entry).await?;

        debug!(
            user_id = %user.id,
            surface = surface.as_str(),
            ip_address = ip_address.unwrap_or("-"),
            "Login recorded"
        );

        Ok(token)
    }

    async fn find_recent_login(
        &self,
        user_id: UserId,
    ) -> Result<Option<DateTime<Utc>>, SessionError> {
        let occurred_at = self.store.session_repo().find_recent_login(user_id).await?;
        Ok(occurred_at)
    }

    async fn find_recent_logins_for_users(
        &self,
        user_ids: &HashSet<UserId>,
    ) -> Result<HashMap<UserId, DateTime<Utc>>, SessionError> {
        let logins = self
            .store
            .session_repo()
            .find_recent_logins_for_users(user_ids)
            .await?;

        Ok(logins)
    }

    async fn resolve_current_user(
        &self,
        user_id: Option<UserId>,
        token: Option<&str>,
        locale: Option<String>,
    ) -> Result<CurrentUser, SessionError> {
        let (Some(user_id), Some(token)) = (user_id, token) else {
            return Ok(CurrentUser::anonymous(locale));
        };

        if !self.is_session_valid(user_id, token).await? {
            return Ok(CurrentUser::anonymous(locale));
        }

        let user = self.store.user_repo().get_by_id(user_id).await?;

        let Some(user) = user.filter(User::is_active) else {
            return Ok(CurrentUser::anonymous(locale));
        };

        let permissions = self
            .store
            .authz_repo()
            .get_permission_ids_for_user(user.id)
            .await?;

        Ok(CurrentUser::authenticated(&user, locale, permissions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SiteId;

    fn user() -> User {
        User {
            id: UserId::generate(),
            created_at: Utc::now(),
            screen_name: "Dana".to_string(),
            email_address: None,
            initialized: true,
            suspended: false,
            deleted: false,
            locale: None,
        }
    }

    #[test]
    fn admin_login_entry_has_ip_but_no_site() {
        let user = user();
        let entry = login_log_entry(&user, Some("10.0.0.7"), &LoginSurface::Admin, Utc::now());

        assert_eq!(entry.event_type, EVENT_USER_LOGGED_IN_TO_ADMIN);
        assert_eq!(entry.initiator_id, Some(user.id));
        assert_eq!(
            entry.data.get("ip_address").and_then(|v| v.as_str()),
            Some("10.0.0.7")
        );
        assert!(!entry.data.contains_key("site_id"));
    }

    #[test]
    fn site_login_entry_carries_site() {
        let entry = login_log_entry(
            &user(),
            None,
            &LoginSurface::Site(SiteId::new("lanparty-2026")),
            Utc::now(),
        );

        assert_eq!(entry.event_type, EVENT_USER_LOGGED_IN_TO_SITE);
        assert!(!entry.data.contains_key("ip_address"));
        assert_eq!(
            entry.data.get("site_id").and_then(|v| v.as_str()),
            Some("lanparty-2026")
        );
    }
}
