//! Login orchestration for the admin and site surfaces.
//!
//! Both surfaces authenticate first, then apply their own gate, and only
//! then issue the session and write the audit entry. Authentication errors
//! are passed through unchanged; gate failures get their own variants so a
//! caller can tell "who are you" apart from "you may not".

use serde::Serialize;
use thiserror::Error;

use crate::domain::events::{UserLoggedInToAdminEvent, UserLoggedInToSiteEvent};
use crate::domain::{BrandId, Password, Site, User, UserId};
use crate::services::authn_service::AuthnError;
use crate::services::session_service::SessionError;

/// Errors of an admin login attempt.
#[derive(Debug, Error)]
pub enum AdminLoginError {
    #[error(transparent)]
    Authentication(#[from] AuthnError),

    #[error("User lacks permission to access the admin area")]
    AuthorizationFailed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AdminLoginError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminLoginError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<SessionError> for AdminLoginError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Database(msg) => Self::Database(msg),
            SessionError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// Errors of a site login attempt.
#[derive(Debug, Error)]
pub enum SiteLoginError {
    #[error(transparent)]
    Authentication(#[from] AuthnError),

    /// Not a hard failure: the user has to pass the consent flow, which the
    /// token opens.
    #[error("Consent required")]
    ConsentRequired { verification_token: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SiteLoginError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SiteLoginError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<SessionError> for SiteLoginError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Database(msg) => Self::Database(msg),
            SessionError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// Session reference handed to the transport layer, e.g. to set a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSession {
    pub user_id: UserId,
    pub token: String,
    pub permanent: bool,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoggedIn<E> {
    pub user: User,
    pub event: E,
    pub session: ClientSession,
}

/// Login request fields shared by both surfaces.
#[derive(Debug)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a Password,
    pub permanent: bool,
    pub ip_address: Option<&'a str>,
}

#[async_trait::async_trait]
pub trait AdminLoginService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AdminLoginError::AuthorizationFailed`] for an authenticated
    /// user without the admin access permission; no session is issued then.
    async fn log_in_user_to_admin(
        &self,
        request: LoginRequest<'_>,
    ) -> Result<LoggedIn<UserLoggedInToAdminEvent>, AdminLoginError>;
}

#[async_trait::async_trait]
pub trait SiteLoginService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SiteLoginError::ConsentRequired`] if the user has not yet
    /// consented to every subject the brand requires; no session is issued
    /// and no login is logged then.
    async fn log_in_user_to_site(
        &self,
        request: LoginRequest<'_>,
        brand_id: &BrandId,
        site: &Site,
    ) -> Result<LoggedIn<UserLoggedInToSiteEvent>, SiteLoginError>;
}

/// Ends the client session.
///
/// The server-side token is kept so the next login reuses it; only a
/// password change or explicit invalidation removes it.
pub fn log_out_user(user: &User, session: ClientSession) {
    tracing::debug!(
        user_id = %user.id,
        permanent = session.permanent,
        "User logged out"
    );
    drop(session);
}
