//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::DisplaySnapshot;

/// Body of `POST /config`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRequest {
    pub text: String,
}

/// Response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `ok`, `unchanged` or `error`
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: DisplaySnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, display: DisplaySnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            display,
        }
    }

    /// The command took effect
    pub fn ok(message: String, display: DisplaySnapshot) -> Self {
        Self::new("ok", message, display)
    }

    /// The command was valid but there was nothing to do
    pub fn unchanged(message: String, display: DisplaySnapshot) -> Self {
        Self::new("unchanged", message, display)
    }

    /// The command was refused
    pub fn error(message: String, display: DisplaySnapshot) -> Self {
        Self::new("error", message, display)
    }

    /// `ok` when `changed`, `unchanged` otherwise
    pub fn outcome(changed: bool, done: &str, noop: &str, display: DisplaySnapshot) -> Self {
        if changed {
            Self::ok(done.to_string(), display)
        } else {
            Self::unchanged(noop.to_string(), display)
        }
    }
}

/// Status response with the full display and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub display: DisplaySnapshot,
    pub config_text: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
