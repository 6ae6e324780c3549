use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::{ApiUser, Viewer};
use crate::error::AppError;
use crate::services::SocialService;

pub async fn list_likes(
    social: web::Data<SocialService>,
    _viewer: Viewer,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let listing = social.list_likes(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// Idempotent: liking an already-liked post answers 201 with the surviving
/// row rather than a conflict.
pub async fn create_like(
    social: web::Data<SocialService>,
    user: ApiUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let like = social.create_like(user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(like))
}

/// A like is addressed by the (caller, post) pair, not a row id; removing
/// an absent like is a successful no-op.
pub async fn delete_like(
    social: web::Data<SocialService>,
    user: ApiUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    social.unlike(user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
