#![allow(dead_code)]

use async_trait::async_trait;
use flasky::config::Config;
use flasky::store::{MemoryStore, Store};
use flasky::structs::actor::Actor;
use flasky::structs::comment::Comment;
use flasky::structs::follow::Follow;
use flasky::structs::post::Post;
use flasky::structs::register_user::RegisterUser;
use flasky::structs::role::{Role, RoleSeed};
use flasky::structs::user::{NewUser, User};
use flasky::utils::app_error::AppError;
use flasky::utils::pagination::Page;
use flasky::utils::authentification::load_auth_user;
use flasky::utils::register::register;
use flasky::utils::roles::{default_role_table, insert_roles};
use flasky::AppState;

pub const SECRET_KEY: &str = "0123456789abcdef0123456789abcdef";

/// Memory-backed state with the default roles seeded.
pub async fn test_app() -> AppState<MemoryStore> {
    test_app_with(Config::testing(SECRET_KEY).expect("valid test config")).await
}

pub async fn test_app_with(config: Config) -> AppState<MemoryStore> {
    let app_state = AppState::new(MemoryStore::new(), config).expect("valid state");
    insert_roles(app_state.store.as_ref(), &default_role_table())
        .await
        .expect("roles seeded");
    app_state
}

pub async fn register_user(app_state: &AppState<MemoryStore>, username: &str, password: &str) -> User {
    register(
        app_state,
        RegisterUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: password.to_string(),
        },
    )
    .await
    .expect("registration succeeds")
}

pub async fn actor_for<S: Store + ?Sized>(store: &S, user: &User) -> Actor {
    let user = store
        .user_by_id(user.id)
        .await
        .expect("store reachable")
        .expect("user exists");
    Actor::Authenticated(load_auth_user(store, user).await.expect("role loaded"))
}

/// Memory store whose standalone follow inserts always fail.
#[derive(Default)]
pub struct RejectingFollows(pub MemoryStore);

#[async_trait]
impl Store for RejectingFollows {
    async fn upsert_roles(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>, AppError> {
        self.0.upsert_roles(seeds).await
    }

    async fn roles(&self) -> Result<Vec<Role>, AppError> {
        self.0.roles().await
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        self.0.role_by_name(name).await
    }

    async fn role_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        self.0.role_by_id(id).await
    }

    async fn default_role(&self) -> Result<Option<Role>, AppError> {
        self.0.default_role().await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        self.0.create_user(new_user).await
    }

    async fn create_user_following_self(&self, new_user: NewUser) -> Result<User, AppError> {
        self.0.create_user_following_self(new_user).await
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.0.user_by_id(id).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.0.user_by_email(email).await
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.0.user_by_username(username).await
    }

    async fn set_confirmed(&self, user_id: i64, confirmed: bool) -> Result<(), AppError> {
        self.0.set_confirmed(user_id, confirmed).await
    }

    async fn set_role(&self, user_id: i64, role_id: Option<i64>) -> Result<bool, AppError> {
        self.0.set_role(user_id, role_id).await
    }

    async fn touch_last_seen(&self, user_id: i64) -> Result<(), AppError> {
        self.0.touch_last_seen(user_id).await
    }

    async fn insert_follow(&self, _follower_id: i64, _followed_id: i64) -> Result<bool, AppError> {
        Err(AppError::InternalServerError)
    }

    async fn delete_follow(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        self.0.delete_follow(follower_id, followed_id).await
    }

    async fn follow_exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        self.0.follow_exists(follower_id, followed_id).await
    }

    async fn followed_ids(&self, follower_id: i64) -> Result<Vec<i64>, AppError> {
        self.0.followed_ids(follower_id).await
    }

    async fn followers_of(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError> {
        self.0.followers_of(user_id, page).await
    }

    async fn followed_by(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError> {
        self.0.followed_by(user_id, page).await
    }

    async fn create_post(&self, author_id: i64, body: &str) -> Result<Post, AppError> {
        self.0.create_post(author_id, body).await
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        self.0.post_by_id(id).await
    }

    async fn update_post_body(&self, id: i64, body: &str) -> Result<Option<Post>, AppError> {
        self.0.update_post_body(id, body).await
    }

    async fn posts_by_authors(&self, author_ids: &[i64], page: Page) -> Result<Vec<Post>, AppError> {
        self.0.posts_by_authors(author_ids, page).await
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, body: &str) -> Result<Comment, AppError> {
        self.0.create_comment(post_id, author_id, body).await
    }

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        self.0.comment_by_id(id).await
    }

    async fn comments_for_post(&self, post_id: i64, page: Page) -> Result<Vec<Comment>, AppError> {
        self.0.comments_for_post(post_id, page).await
    }

    async fn set_comment_disabled(&self, id: i64, disabled: bool) -> Result<Option<Comment>, AppError> {
        self.0.set_comment_disabled(id, disabled).await
    }
}
