/// Data models for pulse-service
///
/// Row types mirror the relational schema; the `*WithStats` shapes are the
/// read-side records the query layer produces, carrying per-viewer context.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Authentication identity. Provisioned externally; rows exist so tokens can
/// be issued and authorship resolved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A named community that posts may optionally belong to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    /// Set once at creation, immutable afterwards.
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub image_path: Option<String>,
    pub rendition_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// Directed subscription edge: `user` follows `author`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A post annotated for a specific viewer: author and group resolved,
/// counts aggregated on read. `viewer_liked` is absent for anonymous
/// viewers rather than computed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostWithStats {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub author: String,
    pub group_id: Option<Uuid>,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    pub image_path: Option<String>,
    pub comment_count: i64,
    pub like_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_liked: Option<bool>,
}

/// Comment with its author's username resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// Aggregated stats shown on a profile page. The follow fields appear only
/// when the viewer is authenticated and is not the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub post_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_follow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

/// One page of a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<PostWithStats>,
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl FeedPage {
    pub fn new(items: Vec<PostWithStats>, page: i64, page_size: i64, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            (total_items + page_size - 1) / page_size
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_page_counts_pages() {
        let page = FeedPage::new(Vec::new(), 1, 10, 25);
        assert_eq!(page.total_pages, 3);

        let empty = FeedPage::new(Vec::new(), 1, 10, 0);
        assert_eq!(empty.total_pages, 1);

        let exact = FeedPage::new(Vec::new(), 1, 10, 20);
        assert_eq!(exact.total_pages, 2);
    }

    #[test]
    fn viewer_liked_omitted_for_anonymous() {
        let post = PostWithStats {
            id: Uuid::new_v4(),
            text: "hello".into(),
            pub_date: Utc::now(),
            author_id: Uuid::new_v4(),
            author: "alice".into(),
            group_id: None,
            group_title: None,
            group_slug: None,
            image_path: None,
            comment_count: 0,
            like_count: 0,
            viewer_liked: None,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("viewer_liked").is_none());
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let user = User {
            id: Uuid::new_v4(),
            username: "bob".into(),
            first_name: "Bob".into(),
            last_name: String::new(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(user.full_name(), "Bob");
    }
}
