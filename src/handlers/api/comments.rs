use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::{ApiUser, Viewer};
use crate::error::AppError;
use crate::forms::CommentForm;
use crate::services::CommentService;

pub async fn list_comments(
    comments: web::Data<CommentService>,
    _viewer: Viewer,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let listing = comments.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

pub async fn create_comment(
    comments: web::Data<CommentService>,
    user: ApiUser,
    path: web::Path<Uuid>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, AppError> {
    let created = comments
        .add_comment(path.into_inner(), user.0.id, &user.0.username, &form)
        .await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_comment(
    comments: web::Data<CommentService>,
    _viewer: Viewer,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (post_id, comment_id) = path.into_inner();
    let comment = comments.get_comment(post_id, comment_id).await?;
    Ok(HttpResponse::Ok().json(comment))
}

pub async fn update_comment(
    comments: web::Data<CommentService>,
    user: ApiUser,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, AppError> {
    let (post_id, comment_id) = path.into_inner();
    let updated = comments
        .update_comment(post_id, comment_id, user.0.id, &form)
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_comment(
    comments: web::Data<CommentService>,
    user: ApiUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (post_id, comment_id) = path.into_inner();
    comments.delete_comment(post_id, comment_id, user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
