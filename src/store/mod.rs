//! Persistence boundary.
//!
//! Every operation of the crate reaches storage through [`Store`]. [`PgStore`]
//! backs a real deployment, [`MemoryStore`] keeps the same semantics in
//! process memory.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::structs::comment::Comment;
use crate::structs::follow::Follow;
use crate::structs::post::Post;
use crate::structs::role::{Role, RoleSeed};
use crate::structs::user::{NewUser, User};
use crate::utils::app_error::AppError;
use crate::utils::pagination::Page;

#[async_trait]
pub trait Store: Send + Sync {
    /// Creates or updates every seed by name as one unit and returns the
    /// resulting rows in table order. Roles absent from `seeds` lose their
    /// default flag.
    async fn upsert_roles(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>, AppError>;

    async fn roles(&self) -> Result<Vec<Role>, AppError>;

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;

    async fn role_by_id(&self, id: i64) -> Result<Option<Role>, AppError>;

    async fn default_role(&self) -> Result<Option<Role>, AppError>;

    /// Fails with `EmailAddressAlreadyUsed` or `UsernameAlreadyUsed` on a clash.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Creates the user together with its self-follow edge, or neither.
    async fn create_user_following_self(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn set_confirmed(&self, user_id: i64, confirmed: bool) -> Result<(), AppError>;

    /// Returns false when the user does not exist.
    async fn set_role(&self, user_id: i64, role_id: Option<i64>) -> Result<bool, AppError>;

    async fn touch_last_seen(&self, user_id: i64) -> Result<(), AppError>;

    /// Returns true when the edge was created, false when it already existed.
    /// Fails with `NotFound("User")` when either end does not exist.
    async fn insert_follow(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    /// Returns true when an edge was removed.
    async fn delete_follow(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    async fn follow_exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    /// Ids of every user `follower_id` follows.
    async fn followed_ids(&self, follower_id: i64) -> Result<Vec<i64>, AppError>;

    /// Edges pointing at `user_id`, newest first.
    async fn followers_of(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError>;

    /// Edges leaving `user_id`, newest first.
    async fn followed_by(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError>;

    /// Fails with `NotFound("User")` for an unknown author.
    async fn create_post(&self, author_id: i64, body: &str) -> Result<Post, AppError>;

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    async fn update_post_body(&self, id: i64, body: &str) -> Result<Option<Post>, AppError>;

    /// Posts written by any of `author_ids`, newest first.
    async fn posts_by_authors(&self, author_ids: &[i64], page: Page) -> Result<Vec<Post>, AppError>;

    /// Fails with `NotFound("Post")` or `NotFound("User")` for an unknown post or author.
    async fn create_comment(&self, post_id: i64, author_id: i64, body: &str) -> Result<Comment, AppError>;

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;

    /// Comments of a post, oldest first.
    async fn comments_for_post(&self, post_id: i64, page: Page) -> Result<Vec<Comment>, AppError>;

    async fn set_comment_disabled(&self, id: i64, disabled: bool) -> Result<Option<Comment>, AppError>;
}
