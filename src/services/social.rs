/// Social-graph operations: follows and likes
///
/// The toggle operations are idempotent get-or-create / delete-if-present;
/// the unique constraints make concurrent duplicates race to one surviving
/// row while both requests observe success. Counts are never denormalized.
///
/// The REST follow creation is stricter than the web toggle: it reports
/// self-follows and duplicates as descriptive validation errors.
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{follow_repo, like_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::metrics::WRITE_OPERATIONS;
use crate::models::User;

#[derive(Clone)]
pub struct SocialService {
    pool: PgPool,
}

impl SocialService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn resolve_author(&self, username: &str) -> Result<User> {
        user_repo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<()> {
        post_repo::find_post(&self.pool, post_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))
    }

    /// Start following `username`. Idempotent: an existing edge is success,
    /// not an error. Self-follows never create a row.
    pub async fn follow(&self, user_id: Uuid, username: &str) -> Result<()> {
        let author = self.resolve_author(username).await?;
        if author.id == user_id {
            return Err(AppError::Validation("cannot follow yourself".to_string()));
        }

        if follow_repo::create_follow(&self.pool, user_id, author.id).await? {
            WRITE_OPERATIONS
                .with_label_values(&["follow", "create"])
                .inc();
        }
        Ok(())
    }

    /// Stop following `username`. A missing edge is a successful no-op.
    pub async fn unfollow(&self, user_id: Uuid, username: &str) -> Result<()> {
        let author = self.resolve_author(username).await?;
        if follow_repo::delete_follow(&self.pool, user_id, author.id).await? {
            WRITE_OPERATIONS
                .with_label_values(&["follow", "delete"])
                .inc();
        }
        Ok(())
    }

    /// Like a post. Idempotent; liking twice leaves exactly one row and the
    /// second call still reports success.
    pub async fn like(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.ensure_post(post_id).await?;
        if like_repo::create_like(&self.pool, user_id, post_id).await? {
            WRITE_OPERATIONS.with_label_values(&["like", "create"]).inc();
        }
        Ok(())
    }

    /// Remove a like. A missing row is a successful no-op.
    pub async fn unlike(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.ensure_post(post_id).await?;
        if like_repo::delete_like(&self.pool, user_id, post_id).await? {
            WRITE_OPERATIONS.with_label_values(&["like", "delete"]).inc();
        }
        Ok(())
    }

    /// REST follow creation. Unlike the web toggle, duplicates are rejected
    /// with a descriptive message rather than silently absorbed.
    pub async fn create_follow_strict(
        &self,
        user_id: Uuid,
        username: &str,
        following: &str,
    ) -> Result<follow_repo::FollowRecord> {
        let author = user_repo::find_by_username(&self.pool, following)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!("following: unknown user '{following}'"))
            })?;

        if author.id == user_id {
            return Err(AppError::Validation("cannot follow yourself".to_string()));
        }

        if follow_repo::exists(&self.pool, user_id, author.id).await? {
            return Err(AppError::Validation(format!(
                "already following '{following}'"
            )));
        }

        follow_repo::create_follow(&self.pool, user_id, author.id).await?;
        WRITE_OPERATIONS
            .with_label_values(&["follow", "create"])
            .inc();

        let record = follow_repo::find_pair(&self.pool, user_id, author.id)
            .await?
            .ok_or_else(|| AppError::Internal("follow vanished after write".to_string()))?;

        Ok(follow_repo::FollowRecord {
            id: record.id,
            user: username.to_string(),
            following: author.username,
        })
    }

    /// Follows pointing at the caller (their followers), optionally searched
    /// by follower username.
    pub async fn list_followers(
        &self,
        user_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<follow_repo::FollowRecord>> {
        Ok(follow_repo::list_followers(&self.pool, user_id, search).await?)
    }

    /// Likes on a post for the REST listing.
    pub async fn list_likes(&self, post_id: Uuid) -> Result<Vec<like_repo::LikeRecord>> {
        self.ensure_post(post_id).await?;
        Ok(like_repo::list_for_post(&self.pool, post_id).await?)
    }

    /// REST like creation; idempotent like the toggle, returning the
    /// surviving row either way.
    pub async fn create_like(&self, user_id: Uuid, post_id: Uuid) -> Result<crate::models::Like> {
        self.like(user_id, post_id).await?;
        like_repo::find_pair(&self.pool, user_id, post_id)
            .await?
            .ok_or_else(|| AppError::Internal("like vanished after write".to_string()))
    }
}
