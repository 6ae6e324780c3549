use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_service::auth::TokenManager;
use pulse_service::cache::PageCache;
use pulse_service::db::create_pool;
use pulse_service::media::MediaStore;
use pulse_service::services::{CommentService, FeedService, PostService, SocialService};
use pulse_service::{handlers, metrics, Config};

/// Readiness: the database must answer.
async fn health(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().body("OK"),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            HttpResponse::ServiceUnavailable().body("DB UNAVAILABLE")
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    tracing::info!(
        "Starting pulse-service v{} (env={})",
        env!("CARGO_PKG_VERSION"),
        config.app.env
    );

    let db_pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to create database pool")?;
    tracing::info!(
        "Database pool ready ({} max connections), migrations applied",
        config.database.max_connections
    );

    let redis_client =
        redis::Client::open(config.cache.url.as_str()).context("Failed to create Redis client")?;
    let page_cache = PageCache::new(redis_client, config.cache.page_ttl_secs);
    match page_cache.ping().await {
        Ok(()) => tracing::info!("Redis connection established"),
        // The page cache degrades to direct DB reads, so an unreachable
        // Redis delays startup usefulness but does not block it.
        Err(e) => tracing::warn!("Redis unreachable at startup: {}", e),
    }
    let media_store = MediaStore::new(config.media.root.clone());
    let token_manager = TokenManager::new(
        &config.auth.token_secret,
        config.auth.access_ttl_secs,
        config.auth.refresh_ttl_secs,
    );

    let feed_service = FeedService::new(db_pool.clone(), config.feed.page_size);
    let post_service = PostService::new(db_pool.clone(), page_cache.clone(), media_store);
    let comment_service = CommentService::new(db_pool.clone(), page_cache.clone());
    let social_service = SocialService::new(db_pool.clone());

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Listening on http://{}", bind_addr);

    let server_config = config.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in server_config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(page_cache.clone()))
            .app_data(web::Data::new(token_manager.clone()))
            .app_data(web::Data::new(feed_service.clone()))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(comment_service.clone()))
            .app_data(web::Data::new(social_service.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route("/health", web::get().to(health))
            .route(
                "/health/live",
                web::get().to(|| async { HttpResponse::Ok().body("ALIVE") }),
            )
            .configure(handlers::routes)
    })
    .bind(&bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")
}
