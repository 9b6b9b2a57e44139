//! `SeaORM` implementation of the `AuthnService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::db::Store;
use crate::domain::{Password, User};
use crate::services::authn_service::{AuthnError, AuthnService};
use crate::services::credential_service::{CredentialError, CredentialService};

pub struct SeaOrmAuthnService {
    store: Store,
    credentials: Arc<dyn CredentialService>,
    auto_migrate_password_hashes: bool,
}

impl SeaOrmAuthnService {
    #[must_use]
    pub fn new(
        store: Store,
        credentials: Arc<dyn CredentialService>,
        auto_migrate_password_hashes: bool,
    ) -> Self {
        Self {
            store,
            credentials,
            auto_migrate_password_hashes,
        }
    }

    async fn find_user(&self, identifier: &str) -> Result<Option<User>, AuthnError> {
        let users = self.store.user_repo();

        let user = if identifier.contains('@') {
            users.find_by_email_address(identifier).await?
        } else {
            users.find_by_screen_name(identifier).await?
        };

        Ok(user)
    }
}

impl From<CredentialError> for AuthnError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Database(msg) => Self::Database(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl AuthnService for SeaOrmAuthnService {
    async fn authenticate(
        &self,
        identifier: &str,
        password: &Password,
    ) -> Result<User, AuthnError> {
        let Some(user) = self.find_user(identifier).await? else {
            return Err(AuthnError::UsernameUnknown);
        };

        if !user.initialized {
            return Err(AuthnError::AccountNotInitialized);
        }

        if user.suspended {
            return Err(AuthnError::AccountSuspended);
        }

        if user.deleted {
            return Err(AuthnError::AccountDeleted);
        }

        if !self
            .credentials
            .is_password_valid_for_user(user.id, password)
            .await?
        {
            return Err(AuthnError::WrongPassword);
        }

        if self.auto_migrate_password_hashes {
            // A failed migration must not fail an otherwise valid login.
            if let Err(e) = self
                .credentials
                .migrate_password_hash_if_outdated(user.id, password)
                .await
            {
                warn!(user_id = %user.id, error = %e, "Failed to migrate password hash");
            }
        }

        debug!(user_id = %user.id, "User authenticated");
        Ok(user)
    }
}
