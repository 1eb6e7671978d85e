use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::warn;

use super::Store;
use crate::structs::comment::Comment;
use crate::structs::follow::Follow;
use crate::structs::permission::Permission;
use crate::structs::post::Post;
use crate::structs::role::{Role, RoleSeed};
use crate::structs::user::{NewUser, User};
use crate::utils::app_error::AppError;
use crate::utils::pagination::Page;

const USER_COLUMNS: &str =
    "id, email, username, password_hash, confirmed, role_id, member_since, last_seen";

#[derive(FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    permissions: i32,
    is_default: bool,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: row.id,
            name: row.name,
            permissions: Permission::from_db(row.permissions),
            is_default: row.is_default,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| {
                warn!("Cannot connect to the database : {e}");
                AppError::Database(e)
            })?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps unique and foreign key violations to the matching domain error.
fn constraint_violation(e: sqlx::Error) -> AppError {
    if let Some(db_error) = e.as_database_error() {
        match db_error.constraint() {
            Some("users_email_key") => return AppError::EmailAddressAlreadyUsed,
            Some("users_username_key") => return AppError::UsernameAlreadyUsed,
            Some("comments_post_id_fkey") => return AppError::NotFound("Post"),
            Some(
                "follows_follower_id_fkey"
                | "follows_followed_id_fkey"
                | "posts_author_id_fkey"
                | "comments_author_id_fkey",
            ) => return AppError::NotFound("User"),
            _ => {}
        }
    }
    warn!("Database error : {e}");
    AppError::Database(e)
}

async fn insert_user<'e, E>(executor: E, new_user: &NewUser) -> Result<User, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, username, password_hash, role_id)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(&new_user.password_hash)
    .bind(new_user.role_id)
    .fetch_one(executor)
    .await
    .map_err(constraint_violation)
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_roles(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>, AppError> {
        let mut tx = self.pool.begin().await?;

        let default_names: Vec<String> = seeds
            .iter()
            .filter(|seed| seed.is_default)
            .map(|seed| seed.name.clone())
            .collect();
        sqlx::query("UPDATE roles SET is_default = FALSE WHERE is_default AND NOT (name = ANY($1))")
            .bind(&default_names)
            .execute(&mut *tx)
            .await?;

        let mut roles = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let row = sqlx::query_as::<_, RoleRow>(
                r"INSERT INTO roles (name, permissions, is_default)
                   VALUES ($1, $2, $3)
                   ON CONFLICT (name) DO UPDATE
                   SET permissions = EXCLUDED.permissions, is_default = EXCLUDED.is_default
                   RETURNING id, name, permissions, is_default",
            )
            .bind(&seed.name)
            .bind(seed.mask().to_db())
            .bind(seed.is_default)
            .fetch_one(&mut *tx)
            .await?;
            roles.push(row.into());
        }

        tx.commit().await?;
        Ok(roles)
    }

    async fn roles(&self) -> Result<Vec<Role>, AppError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, permissions, is_default FROM roles ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, permissions, is_default FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Role::from))
    }

    async fn role_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, permissions, is_default FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Role::from))
    }

    async fn default_role(&self) -> Result<Option<Role>, AppError> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT id, name, permissions, is_default FROM roles WHERE is_default ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Role::from))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        insert_user(&self.pool, &new_user).await
    }

    async fn create_user_following_self(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;
        let user = insert_user(&mut *tx, &new_user).await?;
        sqlx::query("INSERT INTO follows (follower_id, followed_id) VALUES ($1, $1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_confirmed(&self, user_id: i64, confirmed: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET confirmed = $2 WHERE id = $1")
            .bind(user_id)
            .bind(confirmed)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_role(&self, user_id: i64, role_id: Option<i64>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET role_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn touch_last_seen(&self, user_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_seen = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_follow(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r"INSERT INTO follows (follower_id, followed_id)
               VALUES ($1, $2)
               ON CONFLICT (follower_id, followed_id) DO NOTHING",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await
        .map_err(constraint_violation)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_follow(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn follow_exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn followed_ids(&self, follower_id: i64) -> Result<Vec<i64>, AppError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT followed_id FROM follows WHERE follower_id = $1")
                .bind(follower_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn followers_of(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError> {
        Ok(sqlx::query_as::<_, Follow>(
            r"SELECT follower_id, followed_id, timestamp FROM follows
               WHERE followed_id = $1
               ORDER BY timestamp DESC, follower_id DESC
               LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn followed_by(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError> {
        Ok(sqlx::query_as::<_, Follow>(
            r"SELECT follower_id, followed_id, timestamp FROM follows
               WHERE follower_id = $1
               ORDER BY timestamp DESC, followed_id DESC
               LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_post(&self, author_id: i64, body: &str) -> Result<Post, AppError> {
        Ok(sqlx::query_as::<_, Post>(
            r"INSERT INTO posts (author_id, body) VALUES ($1, $2)
               RETURNING id, author_id, body, created_at",
        )
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_violation)?)
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(sqlx::query_as::<_, Post>(
            "SELECT id, author_id, body, created_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_post_body(&self, id: i64, body: &str) -> Result<Option<Post>, AppError> {
        Ok(sqlx::query_as::<_, Post>(
            r"UPDATE posts SET body = $2 WHERE id = $1
               RETURNING id, author_id, body, created_at",
        )
        .bind(id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn posts_by_authors(&self, author_ids: &[i64], page: Page) -> Result<Vec<Post>, AppError> {
        Ok(sqlx::query_as::<_, Post>(
            r"SELECT id, author_id, body, created_at FROM posts
               WHERE author_id = ANY($1)
               ORDER BY created_at DESC, id DESC
               LIMIT $2 OFFSET $3",
        )
        .bind(author_ids)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, body: &str) -> Result<Comment, AppError> {
        Ok(sqlx::query_as::<_, Comment>(
            r"INSERT INTO comments (post_id, author_id, body) VALUES ($1, $2, $3)
               RETURNING id, post_id, author_id, body, disabled, created_at",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(constraint_violation)?)
    }

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, body, disabled, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn comments_for_post(&self, post_id: i64, page: Page) -> Result<Vec<Comment>, AppError> {
        Ok(sqlx::query_as::<_, Comment>(
            r"SELECT id, post_id, author_id, body, disabled, created_at FROM comments
               WHERE post_id = $1
               ORDER BY created_at ASC, id ASC
               LIMIT $2 OFFSET $3",
        )
        .bind(post_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_comment_disabled(&self, id: i64, disabled: bool) -> Result<Option<Comment>, AppError> {
        Ok(sqlx::query_as::<_, Comment>(
            r"UPDATE comments SET disabled = $2 WHERE id = $1
               RETURNING id, post_id, author_id, body, disabled, created_at",
        )
        .bind(id)
        .bind(disabled)
        .fetch_optional(&self.pool)
        .await?)
    }
}
