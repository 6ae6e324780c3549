//! Prometheus metrics for pulse-service.
//!
//! Exposes request/cache collectors and an HTTP handler for the `/metrics`
//! endpoint.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

/// Page cache outcomes: hit, miss, error, invalidate.
pub static PAGE_CACHE_EVENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pulse_page_cache_events_total",
        "Whole-page feed cache events",
        &["event"]
    )
    .expect("register page cache metric")
});

/// Mutations applied through the write endpoints, by entity.
pub static WRITE_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "pulse_write_operations_total",
        "Persisted write operations",
        &["entity", "op"]
    )
    .expect("register write operations metric")
});

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
