//! What the countdown display shows, published on every render

use serde::{Deserialize, Serialize};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Not running, configuration editable
    #[default]
    Idle,
    /// Countdown active, configuration locked
    Running,
    /// Countdown finished and not yet acknowledged
    Alarm,
}

impl SessionPhase {
    pub fn config_locked(self) -> bool {
        !matches!(self, SessionPhase::Idle)
    }
}

/// Configuration status line under the input box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigStatus {
    pub ok: bool,
    pub message: String,
}

/// A full render of the countdown display, including the pocket overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplaySnapshot {
    pub phase: SessionPhase,
    pub remaining_seconds: u64,
    /// `MM:SS`
    pub clock: String,
    /// Fraction of the total still remaining, 0.0 ..= 1.0
    pub progress: f64,
    pub total_minutes: u32,
    pub checkpoints: Vec<u32>,
    pub status: ConfigStatus,
    pub config_locked: bool,
    pub alarm: bool,
    pub pocket_mode: bool,
    /// Incremented once per render
    pub frame: u64,
}

/// Format seconds as `MM:SS`; minutes keep growing past 99
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Remaining fraction of `total_seconds`, clamped to the unit interval
pub fn progress_fraction(seconds: u64, total_seconds: u64) -> f64 {
    if total_seconds == 0 {
        return 0.0;
    }
    (seconds as f64 / total_seconds as f64).clamp(0.0, 1.0)
}
