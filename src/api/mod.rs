//! HTTP API module
//! 
//! The control surface: buttons become POST endpoints, the display becomes
//! a JSON snapshot and an event stream.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/acknowledge", post(acknowledge_handler))
        .route("/config", post(config_handler))
        .route("/pocket", post(pocket_enter_handler).delete(pocket_exit_handler))
        .route("/status", get(status_handler))
        .route("/display/stream", get(display_stream_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
