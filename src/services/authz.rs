use anyhow::Result;
use std::collections::BTreeSet;
use tracing::info;

use crate::db::Store;
use crate::domain::UserId;

/// Permission required to log in to the admin surface.
pub const ADMIN_ACCESS_PERMISSION: &str = "admin.access";

/// Role based permission lookup.
#[derive(Clone)]
pub struct AuthzService {
    store: Store,
}

impl AuthzService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get_permission_ids_for_user(&self, user_id: UserId) -> Result<BTreeSet<String>> {
        self.store
            .authz_repo()
            .get_permission_ids_for_user(user_id)
            .await
    }

    pub async fn has_permission(&self, user_id: UserId, permission_id: &str) -> Result<bool> {
        let permissions = self.get_permission_ids_for_user(user_id).await?;
        Ok(permissions.contains(permission_id))
    }

    pub async fn assign_permission_to_role(&self, permission_id: &str, role_id: &str) -> Result<()> {
        self.store
            .authz_repo()
            .assign_permission_to_role(permission_id, role_id)
            .await
    }

    pub async fn assign_role_to_user(&self, role_id: &str, user_id: UserId) -> Result<()> {
        self.store
            .authz_repo()
            .assign_role_to_user(role_id, user_id)
            .await?;

        info!(user_id = %user_id, role_id, "Role assigned");
        Ok(())
    }

    pub async fn deassign_role_from_user(&self, role_id: &str, user_id: UserId) -> Result<bool> {
        let removed = self
            .store
            .authz_repo()
            .deassign_role_from_user(role_id, user_id)
            .await?;

        if removed {
            info!(user_id = %user_id, role_id, "Role deassigned");
        }
        Ok(removed)
    }
}
