/// Ownership-based permission checks
///
/// Write access to a post or comment belongs to its author alone; everyone
/// else, authenticated or not, gets Forbidden. Read access is unrestricted.
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, Post};

pub fn check_post_author(user_id: Uuid, post: &Post) -> Result<()> {
    if post.author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author may modify this post".to_string(),
        ))
    }
}

pub fn check_comment_author(user_id: Uuid, comment: &Comment) -> Result<()> {
    if comment.author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author may modify this comment".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post_by(author_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            text: "hello".into(),
            pub_date: Utc::now(),
            author_id,
            group_id: None,
            image_path: None,
            rendition_path: None,
        }
    }

    #[test]
    fn author_may_modify() {
        let author = Uuid::new_v4();
        assert!(check_post_author(author, &post_by(author)).is_ok());
    }

    #[test]
    fn non_author_is_forbidden() {
        let post = post_by(Uuid::new_v4());
        let err = check_post_author(Uuid::new_v4(), &post).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn comment_ownership() {
        let author = Uuid::new_v4();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            author_id: author,
            text: "hi".into(),
            created: Utc::now(),
        };
        assert!(check_comment_author(author, &comment).is_ok());
        assert!(check_comment_author(Uuid::new_v4(), &comment).is_err());
    }
}
