//! Browser-facing post and comment mutations.
//!
//! These keep the original navigation contract: a successful write answers
//! with a redirect to the page the user lands on next, and an anonymous
//! request is bounced to the login page by the `WebUser` extractor before
//! the handler runs.

use actix_web::{http::header, web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::WebUser;
use crate::db::post_repo;
use crate::error::AppError;
use crate::forms::{CommentForm, PostForm};
use crate::services::{CommentService, PostService};

/// The post must exist under the username it is addressed by; a valid id
/// under the wrong author is NotFound, not Forbidden.
async fn addressed_post(
    pool: &PgPool,
    username: &str,
    post_id: Uuid,
) -> Result<(), AppError> {
    post_repo::find_by_author_username(pool, username, post_id, None)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id} by '{username}'")))?;
    Ok(())
}

fn redirect_to(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub async fn new_post(
    posts: web::Data<PostService>,
    user: WebUser,
    form: web::Json<PostForm>,
) -> Result<HttpResponse, AppError> {
    posts.create_post(user.0.id, &form).await?;
    Ok(redirect_to("/".to_string()))
}

pub async fn edit_post(
    posts: web::Data<PostService>,
    pool: web::Data<PgPool>,
    user: WebUser,
    path: web::Path<(String, Uuid)>,
    form: web::Json<PostForm>,
) -> Result<HttpResponse, AppError> {
    let (username, post_id) = path.into_inner();
    addressed_post(&pool, &username, post_id).await?;
    posts.update_post(post_id, user.0.id, &form).await?;
    Ok(redirect_to(format!("/{username}/{post_id}/")))
}

pub async fn delete_post(
    posts: web::Data<PostService>,
    pool: web::Data<PgPool>,
    user: WebUser,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (username, post_id) = path.into_inner();
    addressed_post(&pool, &username, post_id).await?;
    posts.delete_post(post_id, user.0.id).await?;
    Ok(redirect_to(format!("/{username}/")))
}

pub async fn add_comment(
    comments: web::Data<CommentService>,
    pool: web::Data<PgPool>,
    user: WebUser,
    path: web::Path<(String, Uuid)>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, AppError> {
    let (username, post_id) = path.into_inner();
    addressed_post(&pool, &username, post_id).await?;
    comments
        .add_comment(post_id, user.0.id, &user.0.username, &form)
        .await?;
    Ok(redirect_to(format!("/{username}/{post_id}/")))
}
