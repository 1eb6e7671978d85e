use tracing::{info, warn};

use crate::store::Store;
use crate::structs::actor::Actor;
use crate::structs::comment::Comment;
use crate::structs::permission::Permission;
use crate::utils::app_error::AppError;
use crate::utils::authentification::require_permission;
use crate::utils::pagination::Page;

pub async fn add_comment<S>(store: &S, actor: &Actor, post_id: i64, body: &str) -> Result<Comment, AppError>
where
    S: Store + ?Sized,
{
    let auth_user = require_permission(actor, Permission::COMMENT)?;
    if body.trim().is_empty() {
        warn!("User {} tried to post an empty comment", auth_user.user.id);
        return Err(AppError::EmptyCommentBody);
    }
    if store.post_by_id(post_id).await?.is_none() {
        return Err(AppError::NotFound("Post"));
    }

    let comment = store.create_comment(post_id, auth_user.user.id, body).await?;
    info!("User {} commented post {}", comment.author_id, post_id);
    Ok(comment)
}

pub async fn get_comment<S>(store: &S, comment_id: i64) -> Result<Comment, AppError>
where
    S: Store + ?Sized,
{
    store
        .comment_by_id(comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment"))
}

/// Comments of a post, oldest first.
pub async fn post_comments<S>(store: &S, post_id: i64, page: Page) -> Result<Vec<Comment>, AppError>
where
    S: Store + ?Sized,
{
    if store.post_by_id(post_id).await?.is_none() {
        return Err(AppError::NotFound("Post"));
    }
    store.comments_for_post(post_id, page).await
}

/// Hides or restores a comment, for moderators.
pub async fn set_comment_disabled<S>(
    store: &S,
    actor: &Actor,
    comment_id: i64,
    disabled: bool,
) -> Result<Comment, AppError>
where
    S: Store + ?Sized,
{
    let auth_user = require_permission(actor, Permission::MODERATE)?;
    let comment = store
        .set_comment_disabled(comment_id, disabled)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    info!(
        "Moderator {} set comment {} disabled={}",
        auth_user.user.id, comment.id, disabled
    );
    Ok(comment)
}
