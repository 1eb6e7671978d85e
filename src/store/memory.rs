use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::warn;

use super::Store;
use crate::structs::comment::Comment;
use crate::structs::follow::Follow;
use crate::structs::post::Post;
use crate::structs::role::{Role, RoleSeed};
use crate::structs::user::{NewUser, User};
use crate::utils::app_error::AppError;
use crate::utils::pagination::Page;

#[derive(Default)]
struct Tables {
    roles: BTreeMap<i64, Role>,
    users: BTreeMap<i64, User>,
    follows: BTreeMap<(i64, i64), Follow>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_user(&mut self, new_user: NewUser) -> Result<User, AppError> {
        if self.users.values().any(|user| user.email == new_user.email) {
            return Err(AppError::EmailAddressAlreadyUsed);
        }
        if self
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Err(AppError::UsernameAlreadyUsed);
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: self.next_id(),
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            confirmed: false,
            role_id: new_user.role_id,
            member_since: now,
            last_seen: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn insert_follow(&mut self, follower_id: i64, followed_id: i64) -> bool {
        let key = (follower_id, followed_id);
        if self.follows.contains_key(&key) {
            return false;
        }
        self.follows.insert(
            key,
            Follow {
                follower_id,
                followed_id,
                timestamp: OffsetDateTime::now_utc(),
            },
        );
        true
    }

    fn require_user(&self, user_id: i64) -> Result<(), AppError> {
        if !self.users.contains_key(&user_id) {
            return Err(AppError::NotFound("User"));
        }
        Ok(())
    }
}

/// Process-local store, one lock over every table.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables.read().map_err(|e| {
            warn!("Memory store lock poisoned : {e}");
            AppError::InternalServerError
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables.write().map_err(|e| {
            warn!("Memory store lock poisoned : {e}");
            AppError::InternalServerError
        })
    }
}

fn newest_first(edges: &mut [Follow]) {
    edges.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| (b.follower_id, b.followed_id).cmp(&(a.follower_id, a.followed_id)))
    });
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_roles(&self, seeds: &[RoleSeed]) -> Result<Vec<Role>, AppError> {
        let mut tables = self.write()?;

        let default_names: HashSet<&str> = seeds
            .iter()
            .filter(|seed| seed.is_default)
            .map(|seed| seed.name.as_str())
            .collect();
        for role in tables.roles.values_mut() {
            if !default_names.contains(role.name.as_str()) {
                role.is_default = false;
            }
        }

        let mut roles = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let existing = tables
                .roles
                .values()
                .find(|role| role.name == seed.name)
                .map(|role| role.id);
            let id = match existing {
                Some(id) => id,
                None => tables.next_id(),
            };
            let role = Role {
                id,
                name: seed.name.clone(),
                permissions: seed.mask(),
                is_default: seed.is_default,
            };
            tables.roles.insert(id, role.clone());
            roles.push(role);
        }
        Ok(roles)
    }

    async fn roles(&self) -> Result<Vec<Role>, AppError> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    async fn role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        Ok(self
            .read()?
            .roles
            .values()
            .find(|role| role.name == name)
            .cloned())
    }

    async fn role_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    async fn default_role(&self) -> Result<Option<Role>, AppError> {
        Ok(self
            .read()?
            .roles
            .values()
            .find(|role| role.is_default)
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.write()?;
        tables.insert_user(new_user)
    }

    async fn create_user_following_self(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.write()?;
        let user = tables.insert_user(new_user)?;
        tables.insert_follow(user.id, user.id);
        Ok(user)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn set_confirmed(&self, user_id: i64, confirmed: bool) -> Result<(), AppError> {
        if let Some(user) = self.write()?.users.get_mut(&user_id) {
            user.confirmed = confirmed;
        }
        Ok(())
    }

    async fn set_role(&self, user_id: i64, role_id: Option<i64>) -> Result<bool, AppError> {
        match self.write()?.users.get_mut(&user_id) {
            Some(user) => {
                user.role_id = role_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn touch_last_seen(&self, user_id: i64) -> Result<(), AppError> {
        if let Some(user) = self.write()?.users.get_mut(&user_id) {
            user.last_seen = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn insert_follow(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        tables.require_user(follower_id)?;
        tables.require_user(followed_id)?;
        Ok(tables.insert_follow(follower_id, followed_id))
    }

    async fn delete_follow(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        Ok(self
            .write()?
            .follows
            .remove(&(follower_id, followed_id))
            .is_some())
    }

    async fn follow_exists(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        Ok(self
            .read()?
            .follows
            .contains_key(&(follower_id, followed_id)))
    }

    async fn followed_ids(&self, follower_id: i64) -> Result<Vec<i64>, AppError> {
        Ok(self
            .read()?
            .follows
            .range((follower_id, i64::MIN)..=(follower_id, i64::MAX))
            .map(|(_, edge)| edge.followed_id)
            .collect())
    }

    async fn followers_of(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError> {
        let mut edges: Vec<Follow> = self
            .read()?
            .follows
            .values()
            .filter(|edge| edge.followed_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut edges);
        Ok(page.apply(edges))
    }

    async fn followed_by(&self, user_id: i64, page: Page) -> Result<Vec<Follow>, AppError> {
        let mut edges: Vec<Follow> = self
            .read()?
            .follows
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|(_, edge)| edge.clone())
            .collect();
        newest_first(&mut edges);
        Ok(page.apply(edges))
    }

    async fn create_post(&self, author_id: i64, body: &str) -> Result<Post, AppError> {
        let mut tables = self.write()?;
        tables.require_user(author_id)?;
        let post = Post {
            id: tables.next_id(),
            author_id,
            body: body.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    async fn update_post_body(&self, id: i64, body: &str) -> Result<Option<Post>, AppError> {
        Ok(self.write()?.posts.get_mut(&id).map(|post| {
            post.body = body.to_string();
            post.clone()
        }))
    }

    async fn posts_by_authors(&self, author_ids: &[i64], page: Page) -> Result<Vec<Post>, AppError> {
        let authors: HashSet<i64> = author_ids.iter().copied().collect();
        let mut posts: Vec<Post> = self
            .read()?
            .posts
            .values()
            .filter(|post| authors.contains(&post.author_id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page.apply(posts))
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, body: &str) -> Result<Comment, AppError> {
        let mut tables = self.write()?;
        if !tables.posts.contains_key(&post_id) {
            return Err(AppError::NotFound("Post"));
        }
        tables.require_user(author_id)?;
        let comment = Comment {
            id: tables.next_id(),
            post_id,
            author_id,
            body: body.to_string(),
            disabled: false,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comment_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.read()?.comments.get(&id).cloned())
    }

    async fn comments_for_post(&self, post_id: i64, page: Page) -> Result<Vec<Comment>, AppError> {
        let mut comments: Vec<Comment> = self
            .read()?
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(page.apply(comments))
    }

    async fn set_comment_disabled(&self, id: i64, disabled: bool) -> Result<Option<Comment>, AppError> {
        Ok(self.write()?.comments.get_mut(&id).map(|comment| {
            comment.disabled = disabled;
            comment.clone()
        }))
    }
}
