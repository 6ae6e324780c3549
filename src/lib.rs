//! pulse-service: a small publishing platform with a social graph.
//!
//! Authors publish short text posts, optionally into a topical group and
//! optionally with an image. Readers comment, like posts, and follow
//! authors; every feed is a page of posts in strict reverse-chronological
//! order, annotated with comment/like counts and the viewer's own like
//! state. The main feed is served whole-page from Redis with a short TTL
//! and coarsely invalidated on any content write.
//!
//! Two HTTP surfaces share one service layer: browser-facing routes that
//! answer with redirects and login bounces, and a token-authenticated REST
//! API under `/v1/`.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
