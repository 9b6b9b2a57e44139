use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};
use std::collections::BTreeSet;

use crate::domain::UserId;
use crate::entities::{authz_role_permissions, authz_user_roles, prelude::*};

pub struct AuthzRepository {
    conn: DatabaseConnection,
}

impl AuthzRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Collect the permissions granted through all of the user's roles.
    pub async fn get_permission_ids_for_user(&self, user_id: UserId) -> Result<BTreeSet<String>> {
        let role_ids: Vec<String> = AuthzUserRoles::find()
            .select_only()
            .column(authz_user_roles::Column::RoleId)
            .filter(authz_user_roles::Column::UserId.eq(user_id.value()))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query roles for user")?;

        if role_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let permission_ids: Vec<String> = AuthzRolePermissions::find()
            .select_only()
            .column(authz_role_permissions::Column::PermissionId)
            .filter(authz_role_permissions::Column::RoleId.is_in(role_ids))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query permissions for roles")?;

        Ok(permission_ids.into_iter().collect())
    }

    pub async fn assign_permission_to_role(&self, permission_id: &str, role_id: &str) -> Result<()> {
        let active_model = authz_role_permissions::ActiveModel {
            role_id: Set(role_id.to_string()),
            permission_id: Set(permission_id.to_string()),
        };

        AuthzRolePermissions::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    authz_role_permissions::Column::RoleId,
                    authz_role_permissions::Column::PermissionId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to assign permission to role")?;

        Ok(())
    }

    pub async fn assign_role_to_user(&self, role_id: &str, user_id: UserId) -> Result<()> {
        let active_model = authz_user_roles::ActiveModel {
            user_id: Set(user_id.value()),
            role_id: Set(role_id.to_string()),
        };

        AuthzUserRoles::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    authz_user_roles::Column::UserId,
                    authz_user_roles::Column::RoleId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to assign role to user")?;

        Ok(())
    }

    pub async fn deassign_role_from_user(&self, role_id: &str, user_id: UserId) -> Result<bool> {
        let result = AuthzUserRoles::delete_many()
            .filter(authz_user_roles::Column::UserId.eq(user_id.value()))
            .filter(authz_user_roles::Column::RoleId.eq(role_id))
            .exec(&self.conn)
            .await
            .context("Failed to deassign role from user")?;

        Ok(result.rows_affected > 0)
    }
}
