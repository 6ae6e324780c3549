use crate::models::User;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, first_name, last_name, password_hash, created_at";

pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Profile row with aggregated counts, computed on read.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub post_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
}

pub async fn profile_stats(
    pool: &PgPool,
    username: &str,
) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT u.id, u.username, u.first_name, u.last_name,
               (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id) AS post_count,
               (SELECT COUNT(*) FROM follows f WHERE f.author_id = u.id) AS follower_count,
               (SELECT COUNT(*) FROM follows f WHERE f.user_id = u.id) AS following_count
        FROM users u
        WHERE u.username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}
