use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{ApiUser, Viewer};
use crate::db::post_repo::{self, PostFilter};
use crate::error::AppError;
use crate::forms::PostForm;
use crate::services::PostService;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub group: Option<Uuid>,
    pub date_after: Option<DateTime<Utc>>,
    pub date_before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    fn filter(&self) -> PostFilter {
        PostFilter {
            group_id: self.group,
            date_after: self.date_after,
            date_before: self.date_before,
        }
    }

    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

pub async fn list_posts(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.filter();
    let limit = query.limit();
    let offset = query.offset();

    let posts = post_repo::list_filtered(&pool, &filter, viewer.id(), limit, offset).await?;
    let total_count = post_repo::count_filtered(&pool, &filter).await?;
    let has_more = offset + (posts.len() as i64) < total_count;

    Ok(HttpResponse::Ok().json(json!({
        "posts": posts,
        "total_count": total_count,
        "has_more": has_more,
    })))
}

pub async fn create_post(
    posts: web::Data<PostService>,
    user: ApiUser,
    form: web::Json<PostForm>,
) -> Result<HttpResponse, AppError> {
    let created = posts.create_post(user.0.id, &form).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_post(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let post_id = path.into_inner();
    let post = post_repo::find_with_stats(&pool, post_id, viewer.id())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn update_post(
    posts: web::Data<PostService>,
    user: ApiUser,
    path: web::Path<Uuid>,
    form: web::Json<PostForm>,
) -> Result<HttpResponse, AppError> {
    let updated = posts.update_post(path.into_inner(), user.0.id, &form).await?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_post(
    posts: web::Data<PostService>,
    user: ApiUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    posts.delete_post(path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
