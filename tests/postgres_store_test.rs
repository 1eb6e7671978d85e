//! `PgStore` against a live database.
//!
//! Run ignored (integration) tests: `DATABASE_URL=... cargo test --test postgres_store_test -- --ignored`

use flasky::store::{PgStore, Store};
use flasky::structs::user::NewUser;
use flasky::utils::app_error::AppError;
use flasky::utils::pagination::Page;
use flasky::utils::roles::{default_role, default_role_table, insert_roles};
use flasky::utils::social::{follow, is_followed_by, is_following, timeline, unfollow};
use sqlx::PgPool;

fn new_user(name: &str, role_id: Option<i64>) -> NewUser {
    NewUser {
        email: format!("{name}@example.com"),
        username: name.to_string(),
        password_hash: "hash".to_string(),
        role_id,
    }
}

#[sqlx::test]
#[ignore]
async fn test_seed_twice_converges(pool: PgPool) {
    let store = PgStore::new(pool);
    let first = insert_roles(&store, &default_role_table()).await.unwrap();
    let second = insert_roles(&store, &default_role_table()).await.unwrap();
    assert_eq!(first, second);

    let roles = store.roles().await.unwrap();
    assert_eq!(roles.len(), 3);
    assert_eq!(roles.iter().filter(|role| role.is_default).count(), 1);
    assert_eq!(default_role(&store).await.unwrap().name, "User");
}

#[sqlx::test]
#[ignore]
async fn test_unique_constraints_map_to_errors(pool: PgPool) {
    let store = PgStore::new(pool);
    store.create_user(new_user("ayoub", None)).await.unwrap();

    assert!(matches!(
        store.create_user(new_user("ayoub", None)).await,
        Err(AppError::EmailAddressAlreadyUsed)
    ));
    let mut clash = new_user("morad", None);
    clash.username = "ayoub".to_string();
    assert!(matches!(
        store.create_user(clash).await,
        Err(AppError::UsernameAlreadyUsed)
    ));
}

#[sqlx::test]
#[ignore]
async fn test_follow_graph_and_timeline(pool: PgPool) {
    let store = PgStore::new(pool);
    let roles = insert_roles(&store, &default_role_table()).await.unwrap();
    let u1 = store.create_user(new_user("ayoub", Some(roles[0].id))).await.unwrap();
    let u2 = store.create_user(new_user("morad", Some(roles[0].id))).await.unwrap();

    follow(&store, u2.id, u2.id).await.unwrap();
    follow(&store, u2.id, u1.id).await.unwrap();
    follow(&store, u2.id, u1.id).await.unwrap();
    assert!(is_following(&store, u2.id, u1.id).await.unwrap());
    assert!(is_followed_by(&store, u1.id, u2.id).await.unwrap());

    let older = store.create_post(u1.id, "older").await.unwrap();
    let newer = store.create_post(u2.id, "newer").await.unwrap();
    let posts = timeline(&store, u2.id, Page::first(20)).await.unwrap();
    let ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    unfollow(&store, u2.id, u1.id).await.unwrap();
    unfollow(&store, u2.id, u1.id).await.unwrap();
    assert!(!is_following(&store, u2.id, u1.id).await.unwrap());
    assert_eq!(timeline(&store, u2.id, Page::first(20)).await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore]
async fn test_create_user_following_self_is_atomic(pool: PgPool) {
    let store = PgStore::new(pool);
    let u = store
        .create_user_following_self(new_user("ayoub", None))
        .await
        .unwrap();
    assert!(is_following(&store, u.id, u.id).await.unwrap());

    assert!(matches!(
        store.create_user_following_self(new_user("ayoub", None)).await,
        Err(AppError::EmailAddressAlreadyUsed)
    ));
    assert_eq!(store.followed_ids(u.id).await.unwrap(), vec![u.id]);
}

#[sqlx::test]
#[ignore]
async fn test_missing_references_map_to_not_found(pool: PgPool) {
    let store = PgStore::new(pool);
    let u = store.create_user(new_user("ayoub", None)).await.unwrap();

    assert!(matches!(
        follow(&store, u.id, 9999).await,
        Err(AppError::NotFound("User"))
    ));
    assert!(matches!(
        follow(&store, 8888, u.id).await,
        Err(AppError::NotFound("User"))
    ));
    assert!(!is_following(&store, u.id, 9999).await.unwrap());

    assert!(matches!(
        store.create_post(9999, "body").await,
        Err(AppError::NotFound("User"))
    ));
    let post = store.create_post(u.id, "body").await.unwrap();
    assert!(matches!(
        store.create_comment(9999, u.id, "hi").await,
        Err(AppError::NotFound("Post"))
    ));
    assert!(matches!(
        store.create_comment(post.id, 9999, "hi").await,
        Err(AppError::NotFound("User"))
    ));
}

#[sqlx::test]
#[ignore]
async fn test_schema_allows_one_default_role(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    insert_roles(&store, &default_role_table()).await.unwrap();

    let second_default = sqlx::query("UPDATE roles SET is_default = TRUE WHERE name = 'Moderator'")
        .execute(&pool)
        .await;
    assert!(second_default.is_err());
    assert_eq!(default_role(&store).await.unwrap().name, "User");
}
