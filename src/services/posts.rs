/// Post service - creation, editing, and deletion
///
/// Mutations validate the form, resolve the optional group reference, store
/// any image upload (which must decode cleanly before anything is
/// persisted), and finish by invalidating the whole-page feed cache.
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::permissions::check_post_author;
use crate::cache::PageCache;
use crate::db::{group_repo, post_repo};
use crate::error::{AppError, Result};
use crate::forms::PostForm;
use crate::media::{self, MediaStore, StoredImage};
use crate::metrics::WRITE_OPERATIONS;
use crate::models::PostWithStats;

#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
    cache: PageCache,
    media: MediaStore,
}

impl PostService {
    pub fn new(pool: PgPool, cache: PageCache, media: MediaStore) -> Self {
        Self { pool, cache, media }
    }

    async fn resolve_group(&self, group_id: Option<Uuid>) -> Result<Option<Uuid>> {
        let Some(group_id) = group_id else {
            return Ok(None);
        };
        group_repo::find_by_id(&self.pool, group_id)
            .await?
            .map(|g| Some(g.id))
            .ok_or_else(|| AppError::Validation("group: does not exist".to_string()))
    }

    /// Validate and store the optional upload. Runs before any row is
    /// written so a bad file leaves the store unmodified.
    async fn store_image(&self, form: &PostForm) -> Result<Option<StoredImage>> {
        let Some(upload) = &form.image else {
            return Ok(None);
        };
        let bytes = media::decode_base64(&upload.content)?;
        Ok(Some(self.media.store(bytes).await?))
    }

    async fn invalidate_feeds(&self) {
        // Coarse by design; a failed bump only means the short TTL does the
        // expiring. Never fails the write.
        if let Err(e) = self.cache.invalidate_all().await {
            tracing::warn!("feed cache invalidation failed: {}", e);
        }
    }

    /// Create a post. The author is always the acting identity.
    pub async fn create_post(&self, author_id: Uuid, form: &PostForm) -> Result<PostWithStats> {
        form.validate()?;
        let group_id = self.resolve_group(form.group).await?;
        let stored = self.store_image(form).await?;

        let post = match post_repo::create_post(
            &self.pool,
            author_id,
            form.text.trim(),
            group_id,
            stored.as_ref().map(|s| s.image_path.as_str()),
            stored.as_ref().map(|s| s.rendition_path.as_str()),
        )
        .await
        {
            Ok(post) => post,
            Err(e) => {
                // No row, no files.
                if let Some(stored) = &stored {
                    self.media.discard(stored);
                }
                return Err(e.into());
            }
        };

        WRITE_OPERATIONS.with_label_values(&["post", "create"]).inc();
        self.invalidate_feeds().await;

        self.annotated(post.id, author_id).await
    }

    /// Edit a post; author-only. A new upload replaces the old files, an
    /// absent one keeps them. `pub_date` is untouched.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        actor_id: Uuid,
        form: &PostForm,
    ) -> Result<PostWithStats> {
        let existing = post_repo::find_post(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;
        check_post_author(actor_id, &existing)?;

        form.validate()?;
        let group_id = self.resolve_group(form.group).await?;
        let stored = self.store_image(form).await?;

        let (image_path, rendition_path) = match &stored {
            Some(s) => (Some(s.image_path.as_str()), Some(s.rendition_path.as_str())),
            None => (
                existing.image_path.as_deref(),
                existing.rendition_path.as_deref(),
            ),
        };

        let post = match post_repo::update_post(
            &self.pool,
            post_id,
            form.text.trim(),
            group_id,
            image_path,
            rendition_path,
        )
        .await
        {
            Ok(post) => post,
            Err(e) => {
                if let Some(stored) = &stored {
                    self.media.discard(stored);
                }
                return Err(e.into());
            }
        };

        if stored.is_some() {
            self.media.remove(&existing);
        }

        WRITE_OPERATIONS.with_label_values(&["post", "update"]).inc();
        self.invalidate_feeds().await;

        self.annotated(post.id, actor_id).await
    }

    /// Delete a post; author-only. Releases the stored image and its cached
    /// rendition. Comments and likes cascade.
    pub async fn delete_post(&self, post_id: Uuid, actor_id: Uuid) -> Result<()> {
        let existing = post_repo::find_post(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;
        check_post_author(actor_id, &existing)?;

        if let Some(deleted) = post_repo::delete_post(&self.pool, post_id).await? {
            self.media.remove(&deleted);
        }

        WRITE_OPERATIONS.with_label_values(&["post", "delete"]).inc();
        self.invalidate_feeds().await;

        Ok(())
    }

    async fn annotated(&self, post_id: Uuid, viewer: Uuid) -> Result<PostWithStats> {
        post_repo::find_with_stats(&self.pool, post_id, Some(viewer))
            .await?
            .ok_or_else(|| AppError::Internal("post vanished after write".to_string()))
    }
}
