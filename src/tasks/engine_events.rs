//! Forwards countdown engine events into the session controller

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::state::AppState;

use super::countdown_engine::EngineEvent;

/// Deliver engine events in order until the engine goes away
pub async fn engine_event_task(state: Arc<AppState>, mut events: mpsc::UnboundedReceiver<EngineEvent>) {
    info!("Starting engine event task");

    while let Some(event) = events.recv().await {
        match state.lock_controller() {
            Ok(mut controller) => controller.handle_engine_event(event),
            Err(e) => error!("Dropping {:?}: {}", event, e),
        }
    }

    info!("Engine event stream closed");
}
