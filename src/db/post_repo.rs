use crate::models::{Post, PostWithStats};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Shared SELECT for viewer-annotated post records. `$1` is always the
/// (possibly NULL) viewer id; for anonymous viewers `viewer_liked` stays
/// NULL instead of being computed.
const POST_STATS_SELECT: &str = r#"
SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author,
       p.group_id, g.title AS group_title, g.slug AS group_slug,
       p.image_path,
       (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
       (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
       CASE WHEN $1::uuid IS NULL THEN NULL
            ELSE EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $1)
       END AS viewer_liked
FROM posts p
JOIN users u ON u.id = p.author_id
LEFT JOIN groups g ON g.id = p.group_id
"#;

/// Create a new post. `pub_date` is set by the database and never updated.
pub async fn create_post(
    pool: &PgPool,
    author_id: Uuid,
    text: &str,
    group_id: Option<Uuid>,
    image_path: Option<&str>,
    rendition_path: Option<&str>,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (author_id, text, group_id, image_path, rendition_path)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, text, pub_date, author_id, group_id, image_path, rendition_path
        "#,
    )
    .bind(author_id)
    .bind(text)
    .bind(group_id)
    .bind(image_path)
    .bind(rendition_path)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Update the mutable fields of a post. `pub_date` and `author_id` are
/// immutable.
pub async fn update_post(
    pool: &PgPool,
    post_id: Uuid,
    text: &str,
    group_id: Option<Uuid>,
    image_path: Option<&str>,
    rendition_path: Option<&str>,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET text = $2, group_id = $3, image_path = $4, rendition_path = $5
        WHERE id = $1
        RETURNING id, text, pub_date, author_id, group_id, image_path, rendition_path
        "#,
    )
    .bind(post_id)
    .bind(text)
    .bind(group_id)
    .bind(image_path)
    .bind(rendition_path)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

pub async fn find_post(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, text, pub_date, author_id, group_id, image_path, rendition_path
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Delete a post, returning the deleted row so the caller can release any
/// stored image files. Comments and likes cascade at the schema level.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        DELETE FROM posts
        WHERE id = $1
        RETURNING id, text, pub_date, author_id, group_id, image_path, rendition_path
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Fetch a single annotated post.
pub async fn find_with_stats(
    pool: &PgPool,
    post_id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<PostWithStats>, sqlx::Error> {
    let sql = format!("{POST_STATS_SELECT} WHERE p.id = $2");
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Fetch an annotated post addressed by its author's username, as the
/// single-post page does. A post id under the wrong username is not found.
pub async fn find_by_author_username(
    pool: &PgPool,
    username: &str,
    post_id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<PostWithStats>, sqlx::Error> {
    let sql = format!("{POST_STATS_SELECT} WHERE p.id = $2 AND u.username = $3");
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(post_id)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn list_global(
    pool: &PgPool,
    viewer: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithStats>, sqlx::Error> {
    let sql = format!("{POST_STATS_SELECT} ORDER BY p.pub_date DESC LIMIT $2 OFFSET $3");
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_global(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
}

pub async fn list_by_group(
    pool: &PgPool,
    group_id: Uuid,
    viewer: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithStats>, sqlx::Error> {
    let sql = format!(
        "{POST_STATS_SELECT} WHERE p.group_id = $2 ORDER BY p.pub_date DESC LIMIT $3 OFFSET $4"
    );
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_by_group(pool: &PgPool, group_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE group_id = $1")
        .bind(group_id)
        .fetch_one(pool)
        .await
}

pub async fn list_by_author(
    pool: &PgPool,
    author_id: Uuid,
    viewer: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithStats>, sqlx::Error> {
    let sql = format!(
        "{POST_STATS_SELECT} WHERE p.author_id = $2 ORDER BY p.pub_date DESC LIMIT $3 OFFSET $4"
    );
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_by_author(pool: &PgPool, author_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await
}

/// Posts by authors the viewer follows.
pub async fn list_following(
    pool: &PgPool,
    viewer: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithStats>, sqlx::Error> {
    let sql = format!(
        "{POST_STATS_SELECT} \
         WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1) \
         ORDER BY p.pub_date DESC LIMIT $2 OFFSET $3"
    );
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_following(pool: &PgPool, viewer: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM posts p
        WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)
        "#,
    )
    .bind(viewer)
    .fetch_one(pool)
    .await
}

/// Posts the viewer has liked.
pub async fn list_liked(
    pool: &PgPool,
    viewer: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithStats>, sqlx::Error> {
    let sql = format!(
        "{POST_STATS_SELECT} \
         WHERE p.id IN (SELECT lk.post_id FROM likes lk WHERE lk.user_id = $1) \
         ORDER BY p.pub_date DESC LIMIT $2 OFFSET $3"
    );
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_liked(pool: &PgPool, viewer: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM posts p
        WHERE p.id IN (SELECT lk.post_id FROM likes lk WHERE lk.user_id = $1)
        "#,
    )
    .bind(viewer)
    .fetch_one(pool)
    .await
}

/// Optional filters for the REST post listing.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub group_id: Option<Uuid>,
    pub date_after: Option<DateTime<Utc>>,
    pub date_before: Option<DateTime<Utc>>,
}

pub async fn list_filtered(
    pool: &PgPool,
    filter: &PostFilter,
    viewer: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithStats>, sqlx::Error> {
    let sql = format!(
        "{POST_STATS_SELECT} \
         WHERE ($2::uuid IS NULL OR p.group_id = $2) \
           AND ($3::timestamptz IS NULL OR p.pub_date >= $3) \
           AND ($4::timestamptz IS NULL OR p.pub_date <= $4) \
         ORDER BY p.pub_date DESC LIMIT $5 OFFSET $6"
    );
    sqlx::query_as::<_, PostWithStats>(&sql)
        .bind(viewer)
        .bind(filter.group_id)
        .bind(filter.date_after)
        .bind(filter.date_before)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_filtered(pool: &PgPool, filter: &PostFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM posts p
        WHERE ($1::uuid IS NULL OR p.group_id = $1)
          AND ($2::timestamptz IS NULL OR p.pub_date >= $2)
          AND ($3::timestamptz IS NULL OR p.pub_date <= $3)
        "#,
    )
    .bind(filter.group_id)
    .bind(filter.date_after)
    .bind(filter.date_before)
    .fetch_one(pool)
    .await
}
