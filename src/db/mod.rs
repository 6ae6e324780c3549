/// Database access layer
///
/// Plain async repository functions over a `PgPool`, one module per entity.
/// Queries return row types from `crate::models`; annotated feed queries live
/// in `post_repo`.
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod like_repo;
pub mod post_repo;
pub mod user_repo;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Create the connection pool and apply pending migrations.
pub async fn create_pool(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
