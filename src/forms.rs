/// Inbound mutation payloads and their validation rules
///
/// Declarative rules live on the structs; referential rules (group must
/// exist, no self-follow, duplicate follow) are checked in the services with
/// the database at hand. Author fields are never accepted from the client.
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn valid_slug(value: &str) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("use letters, digits, hyphens and underscores".into());
        Err(err)
    }
}

/// Base64-encoded file upload embedded in a JSON payload. The stored file's
/// extension comes from the decoded format, not from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    pub content: String,
}

/// Create/edit payload for a post. The author always comes from the
/// authenticated identity, never from the payload.
#[derive(Debug, Deserialize, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    /// Optional group reference; must resolve to an existing group.
    pub group: Option<Uuid>,
    pub image: Option<ImageUpload>,
}

/// Comment payload. Post and author are supplied by the handler.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GroupForm {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "valid_slug"))]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// REST follow creation: the follower is the caller, the followee arrives
/// by username.
#[derive(Debug, Deserialize, Validate)]
pub struct FollowForm {
    #[validate(custom(function = "not_blank"))]
    pub following: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_text_is_required() {
        let form = PostForm {
            text: "   ".into(),
            group: None,
            image: None,
        };
        assert!(form.validate().is_err());

        let form = PostForm {
            text: "hello".into(),
            group: None,
            image: None,
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn comment_text_is_required() {
        let form = CommentForm { text: String::new() };
        assert!(form.validate().is_err());
    }

    #[test]
    fn slug_rules() {
        let mut form = GroupForm {
            title: "Rustaceans".into(),
            slug: "rustaceans-2020".into(),
            description: String::new(),
        };
        assert!(form.validate().is_ok());

        form.slug = "has spaces".into();
        assert!(form.validate().is_err());

        form.slug = String::new();
        assert!(form.validate().is_err());
    }
}
