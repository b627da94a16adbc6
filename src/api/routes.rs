use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        // Metrics exposition
        .route("/metrics", get(handlers::metrics_handler))
        // Classification only (no persistence)
        .route("/v1/classify", post(handlers::classify))
        // Complaint lifecycle
        .route("/v1/complaints", post(handlers::submit_complaint))
        .route("/v1/complaints", get(handlers::list_complaints))
        .route("/v1/complaints/:id", get(handlers::get_complaint))
        .route("/v1/complaints/:id/timeline", get(handlers::get_timeline))
        .route("/v1/complaints/:id/status", put(handlers::update_status))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new())
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
}
