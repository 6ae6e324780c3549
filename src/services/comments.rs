/// Comment service
///
/// Comments hang off an existing post; the post id and author always come
/// from the route and the authenticated identity. Creation invalidates the
/// page cache since comment counts are rendered on feeds.
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::permissions::check_comment_author;
use crate::cache::PageCache;
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::forms::CommentForm;
use crate::metrics::WRITE_OPERATIONS;
use crate::models::{Comment, CommentWithAuthor};

#[derive(Clone)]
pub struct CommentService {
    pool: PgPool,
    cache: PageCache,
}

impl CommentService {
    pub fn new(pool: PgPool, cache: PageCache) -> Self {
        Self { pool, cache }
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<()> {
        post_repo::find_post(&self.pool, post_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))
    }

    /// Resolve a comment within a post, or NotFound. A comment id under the
    /// wrong post is not found.
    async fn comment_in_post(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment> {
        let comment = comment_repo::find_comment(&self.pool, comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;
        Ok(comment)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        author_username: &str,
        form: &CommentForm,
    ) -> Result<CommentWithAuthor> {
        self.ensure_post(post_id).await?;
        form.validate()?;

        let comment =
            comment_repo::create_comment(&self.pool, post_id, author_id, form.text.trim()).await?;

        WRITE_OPERATIONS
            .with_label_values(&["comment", "create"])
            .inc();
        if let Err(e) = self.cache.invalidate_all().await {
            tracing::warn!("feed cache invalidation failed: {}", e);
        }

        Ok(CommentWithAuthor {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author: author_username.to_string(),
            text: comment.text,
            created: comment.created,
        })
    }

    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        self.ensure_post(post_id).await?;
        Ok(comment_repo::list_for_post(&self.pool, post_id).await?)
    }

    pub async fn get_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment> {
        self.ensure_post(post_id).await?;
        self.comment_in_post(post_id, comment_id).await
    }

    /// Author-only edit.
    pub async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        actor_id: Uuid,
        form: &CommentForm,
    ) -> Result<Comment> {
        let existing = self.comment_in_post(post_id, comment_id).await?;
        check_comment_author(actor_id, &existing)?;
        form.validate()?;

        let updated =
            comment_repo::update_comment(&self.pool, comment_id, form.text.trim()).await?;

        WRITE_OPERATIONS
            .with_label_values(&["comment", "update"])
            .inc();

        Ok(updated)
    }

    /// Author-only delete.
    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        actor_id: Uuid,
    ) -> Result<()> {
        let existing = self.comment_in_post(post_id, comment_id).await?;
        check_comment_author(actor_id, &existing)?;

        comment_repo::delete_comment(&self.pool, comment_id).await?;

        WRITE_OPERATIONS
            .with_label_values(&["comment", "delete"])
            .inc();
        // Comment counts are rendered on cached feed pages, so removal
        // invalidates just like creation.
        if let Err(e) = self.cache.invalidate_all().await {
            tracing::warn!("feed cache invalidation failed: {}", e);
        }

        Ok(())
    }
}
