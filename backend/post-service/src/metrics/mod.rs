//! Prometheus metrics for the post service.
//!
//! Exposes request and vote collectors and an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Request latency segmented by method and response status.
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration segmented by method and status",
        &["method", "status"]
    )
    .expect("failed to register http_request_duration_seconds");

    /// Completed vote operations segmented by action.
    pub static ref VOTE_ACTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "vote_actions_total",
        "Completed vote operations segmented by action",
        &["action"]
    )
    .expect("failed to register vote_actions_total");
}

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
