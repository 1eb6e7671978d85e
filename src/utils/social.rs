use tracing::{debug, info};

use crate::store::Store;
use crate::structs::actor::Actor;
use crate::structs::follow::Follow;
use crate::structs::permission::Permission;
use crate::structs::post::Post;
use crate::utils::app_error::AppError;
use crate::utils::authentification::require_permission;
use crate::utils::pagination::Page;

/// Adds the edge `follower_id -> followed_id`; already following is not an error.
pub async fn follow<S>(store: &S, follower_id: i64, followed_id: i64) -> Result<(), AppError>
where
    S: Store + ?Sized,
{
    if store.insert_follow(follower_id, followed_id).await? {
        info!("User {follower_id} now follows {followed_id}");
    } else {
        debug!("User {follower_id} already follows {followed_id}");
    }
    Ok(())
}

/// Removes the edge `follower_id -> followed_id` if it exists.
pub async fn unfollow<S>(store: &S, follower_id: i64, followed_id: i64) -> Result<(), AppError>
where
    S: Store + ?Sized,
{
    if store.delete_follow(follower_id, followed_id).await? {
        info!("User {follower_id} unfollowed {followed_id}");
    }
    Ok(())
}

pub async fn is_following<S>(store: &S, user_id: i64, other_id: i64) -> Result<bool, AppError>
where
    S: Store + ?Sized,
{
    store.follow_exists(user_id, other_id).await
}

pub async fn is_followed_by<S>(store: &S, user_id: i64, other_id: i64) -> Result<bool, AppError>
where
    S: Store + ?Sized,
{
    store.follow_exists(other_id, user_id).await
}

/// Edges pointing at `user_id`, newest first.
pub async fn followers<S>(store: &S, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError>
where
    S: Store + ?Sized,
{
    store.followers_of(user_id, page).await
}

/// Edges leaving `user_id`, newest first.
pub async fn followed<S>(store: &S, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError>
where
    S: Store + ?Sized,
{
    store.followed_by(user_id, page).await
}

/// Same as [`followers`] without the registration self edge.
pub async fn followers_excluding_self<S>(
    store: &S,
    user_id: i64,
    page: Page,
) -> Result<Vec<Follow>, AppError>
where
    S: Store + ?Sized,
{
    let edges = store.followers_of(user_id, Page::new(0, i64::MAX)).await?;
    Ok(page.apply(
        edges
            .into_iter()
            .filter(|edge| edge.follower_id != edge.followed_id),
    ))
}

/// Follows on behalf of a signed-in actor holding FOLLOW.
pub async fn follow_as<S>(store: &S, actor: &Actor, followed_id: i64) -> Result<(), AppError>
where
    S: Store + ?Sized,
{
    let auth_user = require_permission(actor, Permission::FOLLOW)?;
    if store.user_by_id(followed_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    follow(store, auth_user.user.id, followed_id).await
}

pub async fn unfollow_as<S>(store: &S, actor: &Actor, followed_id: i64) -> Result<(), AppError>
where
    S: Store + ?Sized,
{
    let auth_user = require_permission(actor, Permission::FOLLOW)?;
    unfollow(store, auth_user.user.id, followed_id).await
}

/// Posts by everyone `user_id` follows, itself included, newest first.
pub async fn timeline<S>(store: &S, user_id: i64, page: Page) -> Result<Vec<Post>, AppError>
where
    S: Store + ?Sized,
{
    let authors = store.followed_ids(user_id).await?;
    if authors.is_empty() {
        return Ok(Vec::new());
    }
    store.posts_by_authors(&authors, page).await
}
