//! Follow and like toggles for the browser surface.
//!
//! Toggles are idempotent: repeating one is a no-op that still redirects.
//! Follow toggles land on the profile they acted on; like toggles send the
//! user back where they came from, anchored to the post they touched.

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::auth::WebUser;
use crate::error::AppError;
use crate::services::SocialService;

fn redirect_to(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Referer of the toggling request, or the main feed when the header is
/// absent or unreadable.
fn back_to(req: &HttpRequest) -> String {
    req.headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/")
        .to_string()
}

pub async fn profile_follow(
    social: web::Data<SocialService>,
    user: WebUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    // Following yourself is silently skipped here; only the API rejects it.
    if username != user.0.username {
        social.follow(user.0.id, &username).await?;
    }
    Ok(redirect_to(format!("/{username}/")))
}

pub async fn profile_unfollow(
    social: web::Data<SocialService>,
    user: WebUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    social.unfollow(user.0.id, &username).await?;
    Ok(redirect_to(format!("/{username}/")))
}

pub async fn post_like(
    social: web::Data<SocialService>,
    user: WebUser,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    social.like(user.0.id, post_id).await?;
    Ok(redirect_to(format!("{}#post-{post_id}", back_to(&req))))
}

pub async fn post_unlike(
    social: web::Data<SocialService>,
    user: WebUser,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    social.unlike(user.0.id, post_id).await?;
    Ok(redirect_to(format!("{}#post-{post_id}", back_to(&req))))
}
