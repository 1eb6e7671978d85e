use tracing::{info, warn};

use crate::store::Store;
use crate::structs::actor::Actor;
use crate::structs::permission::Permission;
use crate::structs::post::Post;
use crate::utils::app_error::AppError;
use crate::utils::authentification::require_permission;
use crate::utils::pagination::Page;

pub fn check_post_body(auth_user_id: i64, body: &str) -> Result<(), AppError> {
    if body.trim().is_empty() {
        warn!("User {auth_user_id} tried to publish an empty post");
        return Err(AppError::EmptyPostBody);
    }
    Ok(())
}

pub async fn publish_post<S>(store: &S, actor: &Actor, body: &str) -> Result<Post, AppError>
where
    S: Store + ?Sized,
{
    let auth_user = require_permission(actor, Permission::WRITE)?;
    check_post_body(auth_user.user.id, body)?;

    let post = store.create_post(auth_user.user.id, body).await?;
    info!("User {} published post {}", post.author_id, post.id);
    Ok(post)
}

/// Only the author or an administrator may edit a post, and only while holding WRITE.
pub async fn edit_post<S>(store: &S, actor: &Actor, post_id: i64, body: &str) -> Result<Post, AppError>
where
    S: Store + ?Sized,
{
    let user = &require_permission(actor, Permission::WRITE)?.user;
    let post = store
        .post_by_id(post_id)
        .await?
        .ok_or(AppError::NotFound("Post"))?;

    if post.author_id != user.id && !actor.is_administrator() {
        warn!("User {} tried to edit post {} of {}", user.id, post.id, post.author_id);
        return Err(AppError::Forbidden);
    }
    check_post_body(user.id, body)?;

    store
        .update_post_body(post_id, body)
        .await?
        .ok_or(AppError::NotFound("Post"))
}

pub async fn get_post<S>(store: &S, post_id: i64) -> Result<Post, AppError>
where
    S: Store + ?Sized,
{
    store
        .post_by_id(post_id)
        .await?
        .ok_or(AppError::NotFound("Post"))
}

/// Posts written by one user, newest first.
pub async fn user_posts<S>(store: &S, user_id: i64, page: Page) -> Result<Vec<Post>, AppError>
where
    S: Store + ?Sized,
{
    store.posts_by_authors(&[user_id], page).await
}
