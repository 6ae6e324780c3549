//! Read-only browser pages: paginated feeds, profiles and post detail.
//!
//! Every page is JSON over the same shapes the templates used to consume.
//! The main feed is served out of the page cache for anonymous viewers;
//! authenticated viewers bypass the cache because their pages carry
//! per-viewer annotations.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Viewer, WebUser};
use crate::cache::PageCache;
use crate::error::AppError;
use crate::services::{FeedScope, FeedService};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    fn number(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

pub async fn index(
    feed: web::Data<FeedService>,
    cache: web::Data<PageCache>,
    viewer: Viewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = query.number();

    if viewer.id().is_none() {
        if let Some(body) = cache.get_page("index", page).await {
            return Ok(HttpResponse::Ok()
                .content_type("application/json")
                .body(body));
        }
    }

    let feed_page = feed.page(FeedScope::Global, viewer.id(), page).await?;
    let body = serde_json::to_string(&json!({ "page": feed_page }))?;

    if viewer.id().is_none() {
        cache.put_page("index", page, &body).await;
    }

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

pub async fn group_feed(
    feed: web::Data<FeedService>,
    viewer: Viewer,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let group = feed.group_by_slug(&slug).await?;
    let feed_page = feed
        .page(FeedScope::Group(&slug), viewer.id(), query.number())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "group": group, "page": feed_page })))
}

pub async fn profile(
    feed: web::Data<FeedService>,
    viewer: Viewer,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let author = feed.profile(&username, viewer.id()).await?;
    let feed_page = feed
        .page(FeedScope::Author(&username), viewer.id(), query.number())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "author": author, "page": feed_page })))
}

pub async fn post_detail(
    feed: web::Data<FeedService>,
    viewer: Viewer,
    path: web::Path<(String, uuid::Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (username, post_id) = path.into_inner();
    let detail = feed.post_detail(&username, post_id, viewer.id()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn follow_index(
    feed: web::Data<FeedService>,
    user: WebUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let feed_page = feed
        .page(
            FeedScope::Following(user.0.id),
            Some(user.0.id),
            query.number(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "page": feed_page })))
}

pub async fn liked_index(
    feed: web::Data<FeedService>,
    user: WebUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let feed_page = feed
        .page(FeedScope::Liked(user.0.id), Some(user.0.id), query.number())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "page": feed_page })))
}
