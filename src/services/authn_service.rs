//! Domain service for authenticating a user by identifier and password.

use thiserror::Error;

use crate::domain::{Password, User};

/// Why an authentication attempt failed.
///
/// The variants are deliberately coarse: a missing credential and a wrong
/// password are both reported as [`AuthnError::WrongPassword`].
#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("Unknown username")]
    UsernameUnknown,

    #[error("User account is not initialized")]
    AccountNotInitialized,

    #[error("User account is suspended")]
    AccountSuspended,

    #[error("User account is deleted")]
    AccountDeleted,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthnError {
    /// Short label used for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UsernameUnknown => "username_unknown",
            Self::AccountNotInitialized => "account_not_initialized",
            Self::AccountSuspended => "account_suspended",
            Self::AccountDeleted => "account_deleted",
            Self::WrongPassword => "wrong_password",
            Self::Database(_) => "database",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<sea_orm::DbErr> for AuthnError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthnError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AuthnService: Send + Sync {
    /// Checks identity, account state and password, strictly in that order.
    ///
    /// An identifier containing `@` is looked up as an email address,
    /// anything else as a screen name. On success an outdated password hash
    /// may be replaced as a side effect.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as an [`AuthnError`] variant.
    async fn authenticate(&self, identifier: &str, password: &Password)
    -> Result<User, AuthnError>;
}
