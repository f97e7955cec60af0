//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{error::ConfigError, state::AppState};
use super::responses::{ApiResponse, ConfigRequest, HealthResponse, StatusResponse};

type ApiResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

fn internal_error(e: String) -> (StatusCode, Json<ApiResponse>) {
    error!("{}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(e, Default::default())),
    )
}

/// Handle POST /start - Start or continue the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let (started, display) = state
        .perform("start", |c| (c.start(), c.current_display()))
        .map_err(internal_error)?;

    info!("Start endpoint called - started={}", started);
    Ok(Json(ApiResponse::outcome(
        started,
        "Countdown started",
        "Countdown already running",
        display,
    )))
}

/// Handle POST /stop - Halt the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let (stopped, display) = state
        .perform("stop", |c| (c.stop(), c.current_display()))
        .map_err(internal_error)?;

    info!("Stop endpoint called - stopped={}", stopped);
    Ok(Json(ApiResponse::outcome(
        stopped,
        "Countdown stopped",
        "Countdown already stopped",
        display,
    )))
}

/// Handle POST /acknowledge - Dismiss the finished-countdown alarm
pub async fn acknowledge_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let (dismissed, display) = state
        .perform("acknowledge", |c| (c.acknowledge(), c.current_display()))
        .map_err(internal_error)?;

    Ok(Json(ApiResponse::outcome(
        dismissed,
        "Alarm dismissed",
        "No alarm to dismiss",
        display,
    )))
}

/// Handle POST /config - Apply a new duration and checkpoint list
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigRequest>,
) -> ApiResult {
    let (result, display) = state
        .perform("config", |c| (c.apply_configuration(&request.text), c.current_display()))
        .map_err(internal_error)?;

    match result {
        Ok(config) => {
            info!("Config endpoint called - {}", config.summary());
            Ok(Json(ApiResponse::ok(config.summary(), display)))
        }
        Err(e @ ConfigError::InvalidFormat) => {
            warn!("Config endpoint rejected {:?}", request.text);
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::error(e.to_string(), display)),
            ))
        }
        Err(e @ ConfigError::Locked) => Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(e.to_string(), display)),
        )),
    }
}

/// Handle POST /pocket - Show the pocket overlay
pub async fn pocket_enter_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let (result, display) = state
        .perform("pocket", |c| (c.enter_pocket_mode(), c.current_display()))
        .map_err(internal_error)?;

    match result {
        Ok(()) => Ok(Json(ApiResponse::ok("Pocket mode on".to_string(), display))),
        Err(e) => Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(e.to_string(), display)),
        )),
    }
}

/// Handle DELETE /pocket - Hide the pocket overlay
pub async fn pocket_exit_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let (left, display) = state
        .perform("pocket-exit", |c| (c.exit_pocket_mode(), c.current_display()))
        .map_err(internal_error)?;

    Ok(Json(ApiResponse::outcome(
        left,
        "Pocket mode off",
        "Pocket mode was not on",
        display,
    )))
}

/// Handle GET /status - Return the current display and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let (display, config_text) = match state.get_display() {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to get display: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display,
        config_text,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /display/stream - One server-sent `display` event per render
pub async fn display_stream_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let rx = state.subscribe_display().map_err(|e| {
        error!("Failed to subscribe to display: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // The current frame goes out first, then one event per change
    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default()
            .event("display")
            .json_data(&snapshot)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Some((Ok(event), (rx, false)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
