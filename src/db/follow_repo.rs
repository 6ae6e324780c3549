use crate::models::Follow;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Idempotent create; the unique constraint on `(user_id, author_id)` makes
/// concurrent duplicates race to a single surviving row. Returns true if a
/// new row was inserted.
pub async fn create_follow(
    pool: &PgPool,
    user_id: Uuid,
    author_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_as::<_, (Uuid,)>(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

/// Idempotent delete; returns true if a row was removed.
pub async fn delete_follow(
    pool: &PgPool,
    user_id: Uuid,
    author_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        "DELETE FROM follows WHERE user_id = $1 AND author_id = $2",
    )
    .bind(user_id)
    .bind(author_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

pub async fn exists(pool: &PgPool, user_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
}

pub async fn find_pair(
    pool: &PgPool,
    user_id: Uuid,
    author_id: Uuid,
) -> Result<Option<Follow>, sqlx::Error> {
    sqlx::query_as::<_, Follow>(
        r#"
        SELECT id, user_id, author_id, created_at
        FROM follows
        WHERE user_id = $1 AND author_id = $2
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
}

/// Follow edge with both usernames resolved, as the REST listing serves it.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct FollowRecord {
    pub id: Uuid,
    pub user: String,
    pub following: String,
}

/// LIKE/ILIKE treat `%`, `_` and `\` specially; a search term is literal
/// text, so escape them before binding.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Follows pointing at `author_id` (that user's followers), optionally
/// filtered by a substring of the follower's username.
pub async fn list_followers(
    pool: &PgPool,
    author_id: Uuid,
    search: Option<&str>,
) -> Result<Vec<FollowRecord>, sqlx::Error> {
    sqlx::query_as::<_, FollowRecord>(
        r#"
        SELECT f.id, fu.username AS "user", au.username AS following
        FROM follows f
        JOIN users fu ON fu.id = f.user_id
        JOIN users au ON au.id = f.author_id
        WHERE f.author_id = $1
          AND ($2::text IS NULL OR fu.username ILIKE '%' || $2 || '%')
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(author_id)
    .bind(search.map(escape_like))
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_terms_are_literal() {
        assert_eq!(escape_like("100%_sure"), "100\\%\\_sure");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
