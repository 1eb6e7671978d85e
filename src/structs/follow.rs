use serde::Serialize;
use time::OffsetDateTime;

/// Directed edge `follower_id -> followed_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Follow {
    pub follower_id: i64,
    pub followed_id: i64,
    pub timestamp: OffsetDateTime,
}
