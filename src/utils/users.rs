use tracing::info;

use crate::store::Store;
use crate::structs::role::Role;
use crate::structs::user::User;
use crate::utils::app_error::AppError;

pub async fn get_user<S>(store: &S, user_id: i64) -> Result<User, AppError>
where
    S: Store + ?Sized,
{
    store
        .user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))
}

/// Moves a user to another role, looked up by name.
pub async fn change_role<S>(store: &S, user_id: i64, role_name: &str) -> Result<Role, AppError>
where
    S: Store + ?Sized,
{
    let role = store
        .role_by_name(role_name)
        .await?
        .ok_or_else(|| AppError::UnknownRole(role_name.to_string()))?;
    if !store.set_role(user_id, Some(role.id)).await? {
        return Err(AppError::NotFound("User"));
    }
    info!("User {user_id} is now {}", role.name);
    Ok(role)
}

/// Refreshes `last_seen`.
pub async fn ping<S>(store: &S, user_id: i64) -> Result<(), AppError>
where
    S: Store + ?Sized,
{
    store.touch_last_seen(user_id).await
}
