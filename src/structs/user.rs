use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub confirmed: bool,
    pub role_id: Option<i64>,
    pub member_since: OffsetDateTime,
    pub last_seen: OffsetDateTime,
}

pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role_id: Option<i64>,
}
