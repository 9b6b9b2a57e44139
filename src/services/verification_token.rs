use anyhow::Result;
use chrono::Utc;
use tracing::debug;

use crate::db::{Purpose, Store, VerificationToken};
use crate::domain::UserId;

/// Issues and redeems out-of-band verification tokens.
#[derive(Clone)]
pub struct VerificationTokenService {
    store: Store,
}

impl VerificationTokenService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_for_consent(&self, user_id: UserId) -> Result<VerificationToken> {
        self.create(user_id, Purpose::Consent).await
    }

    pub async fn create_for_password_reset(&self, user_id: UserId) -> Result<VerificationToken> {
        self.create(user_id, Purpose::PasswordReset).await
    }

    async fn create(&self, user_id: UserId, purpose: Purpose) -> Result<VerificationToken> {
        let token = self
            .store
            .verification_token_repo()
            .create(user_id, purpose)
            .await?;

        debug!(user_id = %user_id, purpose = %purpose, "Verification token created");
        Ok(token)
    }

    pub async fn find_for_consent_by_token(&self, token: &str) -> Result<Option<VerificationToken>> {
        self.find_valid(token, Purpose::Consent).await
    }

    pub async fn find_for_password_reset_by_token(
        &self,
        token: &str,
    ) -> Result<Option<VerificationToken>> {
        self.find_valid(token, Purpose::PasswordReset).await
    }

    /// Expired tokens are treated as absent.
    async fn find_valid(&self, token: &str, purpose: Purpose) -> Result<Option<VerificationToken>> {
        let found = self
            .store
            .verification_token_repo()
            .find(token, purpose)
            .await?;

        Ok(found.filter(|t| !t.is_expired(Utc::now())))
    }

    pub async fn delete_token(&self, token: &str) -> Result<bool> {
        self.store.verification_token_repo().delete(token).await
    }

    pub async fn delete_tokens_for_user(&self, user_id: UserId) -> Result<u64> {
        self.store
            .verification_token_repo()
            .delete_for_user(user_id)
            .await
    }
}
