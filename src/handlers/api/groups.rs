use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::ApiUser;
use crate::db::group_repo;
use crate::error::AppError;
use crate::forms::GroupForm;
use crate::metrics::WRITE_OPERATIONS;

pub async fn list_groups(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let groups = group_repo::list_groups(&pool).await?;
    Ok(HttpResponse::Ok().json(groups))
}

pub async fn create_group(
    pool: web::Data<PgPool>,
    _user: ApiUser,
    form: web::Json<GroupForm>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;

    if group_repo::slug_exists(&pool, &form.slug).await? {
        return Err(AppError::Validation(format!(
            "slug: '{}' is already in use",
            form.slug
        )));
    }

    let group = group_repo::create_group(
        &pool,
        form.title.trim(),
        &form.slug,
        form.description.trim(),
    )
    .await?;

    WRITE_OPERATIONS.with_label_values(&["group", "create"]).inc();
    Ok(HttpResponse::Created().json(group))
}
