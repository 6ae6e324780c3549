use crate::models::Like;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Idempotent create; concurrent duplicate likes race safely to at most one
/// surviving row and the loser still observes success. Returns true if a new
/// row was inserted.
pub async fn create_like(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO likes (user_id, post_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, post_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

/// Idempotent delete; returns true if a row was removed.
pub async fn delete_like(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

pub async fn find_pair(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<Option<Like>, sqlx::Error> {
    sqlx::query_as::<_, Like>(
        r#"
        SELECT id, user_id, post_id, created_at
        FROM likes
        WHERE user_id = $1 AND post_id = $2
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Like with the liker's username resolved.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct LikeRecord {
    pub id: Uuid,
    pub user: String,
    pub post_id: Uuid,
}

pub async fn list_for_post(pool: &PgPool, post_id: Uuid) -> Result<Vec<LikeRecord>, sqlx::Error> {
    sqlx::query_as::<_, LikeRecord>(
        r#"
        SELECT l.id, u.username AS "user", l.post_id
        FROM likes l
        JOIN users u ON u.id = l.user_id
        WHERE l.post_id = $1
        ORDER BY l.created_at DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}
