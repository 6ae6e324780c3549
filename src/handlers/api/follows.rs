use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::auth::ApiUser;
use crate::error::AppError;
use crate::forms::FollowForm;
use crate::services::SocialService;

#[derive(Debug, Deserialize)]
pub struct FollowQuery {
    pub search: Option<String>,
}

/// Follows pointing at the caller, optionally filtered by follower
/// username substring.
pub async fn list_follows(
    social: web::Data<SocialService>,
    user: ApiUser,
    query: web::Query<FollowQuery>,
) -> Result<HttpResponse, AppError> {
    let listing = social
        .list_followers(user.0.id, query.search.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(listing))
}

pub async fn create_follow(
    social: web::Data<SocialService>,
    user: ApiUser,
    form: web::Json<FollowForm>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;
    let record = social
        .create_follow_strict(user.0.id, &user.0.username, &form.following)
        .await?;
    Ok(HttpResponse::Created().json(record))
}
