/// Feed and profile queries
///
/// The read side of the system: ordered, paginated post listings annotated
/// with per-viewer context, and profile stats. Scope targets (group slug,
/// username) are resolved before any listing; an unknown target is NotFound,
/// not an empty feed.
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{comment_repo, follow_repo, group_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{AuthorProfile, CommentWithAuthor, FeedPage, Group, PostWithStats};

/// What slice of posts a feed shows.
#[derive(Debug, Clone, Copy)]
pub enum FeedScope<'a> {
    Global,
    Group(&'a str),
    Author(&'a str),
    /// Posts by authors the viewer follows.
    Following(Uuid),
    /// Posts the viewer has liked.
    Liked(Uuid),
}

/// Single-post page payload: the post, its author's profile card, and the
/// comment thread.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostWithStats,
    pub author: AuthorProfile,
    pub comments: Vec<CommentWithAuthor>,
}

#[derive(Clone)]
pub struct FeedService {
    pool: PgPool,
    page_size: i64,
}

impl FeedService {
    pub fn new(pool: PgPool, page_size: i64) -> Self {
        Self { pool, page_size }
    }

    /// One page of a feed, strictly `pub_date` descending.
    pub async fn page(
        &self,
        scope: FeedScope<'_>,
        viewer: Option<Uuid>,
        page: i64,
    ) -> Result<FeedPage> {
        let page = page.max(1);
        let offset = page_offset(page, self.page_size);

        let (items, total) = match scope {
            FeedScope::Global => {
                let items =
                    post_repo::list_global(&self.pool, viewer, self.page_size, offset).await?;
                (items, post_repo::count_global(&self.pool).await?)
            }
            FeedScope::Group(slug) => {
                let group = self.resolve_group(slug).await?;
                let items =
                    post_repo::list_by_group(&self.pool, group.id, viewer, self.page_size, offset)
                        .await?;
                (items, post_repo::count_by_group(&self.pool, group.id).await?)
            }
            FeedScope::Author(username) => {
                let author = self.resolve_user(username).await?;
                let items =
                    post_repo::list_by_author(&self.pool, author, viewer, self.page_size, offset)
                        .await?;
                (items, post_repo::count_by_author(&self.pool, author).await?)
            }
            FeedScope::Following(user_id) => {
                let items =
                    post_repo::list_following(&self.pool, user_id, self.page_size, offset).await?;
                (items, post_repo::count_following(&self.pool, user_id).await?)
            }
            FeedScope::Liked(user_id) => {
                let items =
                    post_repo::list_liked(&self.pool, user_id, self.page_size, offset).await?;
                (items, post_repo::count_liked(&self.pool, user_id).await?)
            }
        };

        Ok(FeedPage::new(items, page, self.page_size, total))
    }

    /// Resolve a group slug or fail NotFound.
    pub async fn group_by_slug(&self, slug: &str) -> Result<Group> {
        group_repo::find_by_slug(&self.pool, slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{slug}'")))
    }

    async fn resolve_group(&self, slug: &str) -> Result<Group> {
        self.group_by_slug(slug).await
    }

    async fn resolve_user(&self, username: &str) -> Result<Uuid> {
        user_repo::find_by_username(&self.pool, username)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))
    }

    /// Profile card with aggregated stats. Follow fields appear only for an
    /// authenticated viewer looking at someone else's profile.
    pub async fn profile(&self, username: &str, viewer: Option<Uuid>) -> Result<AuthorProfile> {
        let row = user_repo::profile_stats(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))?;

        let (can_follow, is_following) = match viewer {
            Some(viewer_id) if viewer_id != row.id => {
                let following = follow_repo::exists(&self.pool, viewer_id, row.id).await?;
                (Some(true), Some(following))
            }
            _ => (None, None),
        };

        let full_name = format!("{} {}", row.first_name, row.last_name)
            .trim()
            .to_string();

        Ok(AuthorProfile {
            id: row.id,
            username: row.username,
            full_name,
            post_count: row.post_count,
            follower_count: row.follower_count,
            following_count: row.following_count,
            can_follow,
            is_following,
        })
    }

    /// Single post addressed as `/{username}/{post_id}/`. The username is
    /// part of the address: a valid post id under the wrong author is
    /// NotFound.
    pub async fn post_detail(
        &self,
        username: &str,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostDetail> {
        let post = post_repo::find_by_author_username(&self.pool, username, post_id, viewer)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id} by '{username}'")))?;

        let author = self.profile(username, viewer).await?;
        let comments = comment_repo::list_for_post(&self.pool, post_id).await?;

        Ok(PostDetail {
            post,
            author,
            comments,
        })
    }
}

/// SQL OFFSET for a 1-based page number. The page number arrives straight
/// from the query string, so the multiplication saturates instead of
/// overflowing; an absurd page simply lands past the last row.
fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1).saturating_mul(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[test]
    fn page_offset_is_zero_based() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
    }

    #[test]
    fn page_offset_saturates_on_huge_pages() {
        assert_eq!(page_offset(i64::MAX, 10), i64::MAX);
        assert!(page_offset(i64::MAX - 1, 7) > 0);
    }

    #[tokio::test]
    async fn huge_page_number_does_not_panic() {
        // Lazy pool: the request must reach the query (and fail there),
        // not blow up computing the offset.
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_lazy("postgresql://localhost:1/unreachable")
            .unwrap();
        let feed = FeedService::new(pool, 10);

        let result = feed.page(FeedScope::Global, None, i64::MAX).await;
        assert!(result.is_err());
    }
}
