//! Shared application state handed to the HTTP layer and background tasks

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::session::SessionController;

use super::DisplaySnapshot;

/// Main application state: the single session controller plus server metadata
pub struct AppState {
    /// The one controller for this process
    pub controller: Arc<Mutex<SessionController>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(controller: SessionController, port: u16, host: String) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Lock the controller. Never hold the guard across an `.await`.
    pub fn lock_controller(&self) -> Result<MutexGuard<'_, SessionController>, String> {
        self.controller
            .lock()
            .map_err(|e| format!("Failed to lock session controller: {}", e))
    }

    /// Run a user-initiated operation on the controller and record it as the last action
    pub fn perform<F, R>(&self, action: &str, operation: F) -> Result<R, String>
    where
        F: FnOnce(&mut SessionController) -> R,
    {
        let result = {
            let mut controller = self.lock_controller()?;
            operation(&mut controller)
        };

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(result)
    }

    /// Current display plus the raw configuration text
    pub fn get_display(&self) -> Result<(DisplaySnapshot, String), String> {
        let controller = self.lock_controller()?;
        Ok((controller.current_display(), controller.raw_config().to_string()))
    }

    /// Follow every render from now on
    pub fn subscribe_display(&self) -> Result<watch::Receiver<DisplaySnapshot>, String> {
        Ok(self.lock_controller()?.subscribe())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;
        
        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
