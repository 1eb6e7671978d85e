use std::collections::HashSet;

use tracing::{info, warn};

use crate::store::Store;
use crate::structs::permission::Permission;
use crate::structs::role::{Role, RoleSeed};
use crate::utils::app_error::AppError;

/// Roles every installation starts with.
pub fn default_role_table() -> Vec<RoleSeed> {
    vec![
        RoleSeed::new(
            "User",
            &[Permission::FOLLOW, Permission::COMMENT, Permission::WRITE],
            true,
        ),
        RoleSeed::new(
            "Moderator",
            &[
                Permission::FOLLOW,
                Permission::COMMENT,
                Permission::WRITE,
                Permission::MODERATE,
            ],
            false,
        ),
        RoleSeed::new(
            "Administrator",
            &[
                Permission::FOLLOW,
                Permission::COMMENT,
                Permission::WRITE,
                Permission::MODERATE,
                Permission::ADMIN,
            ],
            false,
        ),
    ]
}

pub fn validate_role_table(table: &[RoleSeed]) -> Result<(), AppError> {
    if table.is_empty() {
        return Err(AppError::InvalidRoleTable("the table is empty".to_string()));
    }

    let mut names = HashSet::new();
    for seed in table {
        if seed.name.trim().is_empty() {
            return Err(AppError::InvalidRoleTable(
                "role names cannot be blank".to_string(),
            ));
        }
        if !names.insert(seed.name.as_str()) {
            return Err(AppError::InvalidRoleTable(format!(
                "role `{}` is listed twice",
                seed.name
            )));
        }
    }

    let defaults = table.iter().filter(|seed| seed.is_default).count();
    if defaults != 1 {
        return Err(AppError::InvalidRoleTable(format!(
            "exactly one default role is required, found {defaults}"
        )));
    }

    Ok(())
}

/// Upserts the table by role name. Running it again converges to the same rows.
pub async fn insert_roles<S>(store: &S, table: &[RoleSeed]) -> Result<Vec<Role>, AppError>
where
    S: Store + ?Sized,
{
    validate_role_table(table).map_err(|e| {
        warn!("Refusing to seed roles : {e}");
        e
    })?;

    let roles = store.upsert_roles(table).await?;
    for role in &roles {
        info!(
            "Role {} seeded with permissions {:#x}{}",
            role.name,
            role.permissions.bits(),
            if role.is_default { " (default)" } else { "" }
        );
    }
    Ok(roles)
}

/// Role given to new users.
pub async fn default_role<S>(store: &S) -> Result<Role, AppError>
where
    S: Store + ?Sized,
{
    store.default_role().await?.ok_or_else(|| {
        warn!("No default role configured");
        AppError::NoDefaultRole
    })
}
