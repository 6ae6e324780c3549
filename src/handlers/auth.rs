//! Token endpoints for the REST API.
//!
//! Credentials never leave this module: a failed lookup and a failed
//! password check answer identically so usernames cannot be probed.

use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{verify_password, TokenManager};
use crate::db::user_repo;
use crate::error::AppError;
use crate::forms::{RefreshRequest, TokenRequest};

pub async fn obtain_token(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenManager>,
    form: web::Json<TokenRequest>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;

    let user = user_repo::find_by_username(&pool, &form.username)
        .await?
        .filter(|u| verify_password(&form.password, &u.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let pair = tokens.issue_pair(user.id, &user.username)?;
    Ok(HttpResponse::Ok().json(pair))
}

pub async fn refresh_token(
    tokens: web::Data<TokenManager>,
    form: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    let pair = tokens.refresh(&form.refresh)?;
    Ok(HttpResponse::Ok().json(pair))
}
