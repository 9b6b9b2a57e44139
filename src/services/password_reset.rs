//! Password reset through an emailed verification token.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::db::VerificationToken;
use crate::domain::events::PasswordUpdatedEvent;
use crate::domain::{Password, User};
use crate::services::credential_service::{CredentialError, CredentialService};
use crate::services::users::UserDirectory;
use crate::services::verification_token::VerificationTokenService;

#[derive(Debug, Error)]
pub enum PasswordResetError {
    /// Unknown, already used, or older than the reset token lifetime.
    #[error("Invalid or expired password reset token")]
    InvalidToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PasswordResetError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<CredentialError> for PasswordResetError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Database(msg) => Self::Database(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct PasswordResetService {
    users: UserDirectory,
    credentials: Arc<dyn CredentialService>,
    verification_tokens: VerificationTokenService,
}

impl PasswordResetService {
    #[must_use]
    pub fn new(
        users: UserDirectory,
        credentials: Arc<dyn CredentialService>,
        verification_tokens: VerificationTokenService,
    ) -> Self {
        Self {
            users,
            credentials,
            verification_tokens,
        }
    }

    /// Issues the token to be sent to the user out of band.
    pub async fn prepare_password_reset(
        &self,
        user: &User,
    ) -> Result<VerificationToken, PasswordResetError> {
        let token = self
            .verification_tokens
            .create_for_password_reset(user.id)
            .await?;

        info!(user_id = %user.id, "Password reset requested");
        Ok(token)
    }

    /// Sets a new password for the token's user and consumes the token.
    ///
    /// Like any password update this invalidates the user's sessions. The
    /// user is recorded as their own initiator.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &Password,
    ) -> Result<PasswordUpdatedEvent, PasswordResetError> {
        let Some(verification_token) = self
            .verification_tokens
            .find_for_password_reset_by_token(token)
            .await?
        else {
            return Err(PasswordResetError::InvalidToken);
        };

        let user = self
            .users
            .get_user(verification_token.user_id)
            .await?
            .ok_or(PasswordResetError::InvalidToken)?;

        let event = self
            .credentials
            .update_password_hash(&user, password, &user)
            .await?;

        self.verification_tokens.delete_token(token).await?;

        info!(user_id = %user.id, "Password reset");
        Ok(event)
    }
}
