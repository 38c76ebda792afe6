use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/practice", axum::routing::delete(handlers::dispose))
        .route("/practice/preview", post(handlers::preview))
        .route("/practice/frame", post(handlers::push_frame))
        .route("/practice/start", post(handlers::start_session))
        .route("/practice/stop", post(handlers::stop_session))
        // Session queries
        .route("/practice/status", get(handlers::get_status))
        .route("/practice/history", get(handlers::get_history))
        .route("/practice/events", get(handlers::event_stream))
        // Standalone analysis
        .route("/similarity", post(handlers::analyze_similarity))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // The practice page is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
