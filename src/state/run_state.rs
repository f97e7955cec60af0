//! Persisted run state, rehydrated when the daemon restarts

use serde::{Deserialize, Serialize};

/// Countdown progress that survives a restart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub is_running: bool,
    /// Epoch milliseconds at which the countdown reaches zero
    #[serde(default)]
    pub target_timestamp: Option<i64>,
    /// Last rendered value; the starting point of the next `start()`
    #[serde(default)]
    pub last_known_seconds_remaining: u64,
}

impl RunState {
    /// An idle state showing `seconds` on the display
    pub fn idle(seconds: u64) -> Self {
        Self {
            is_running: false,
            target_timestamp: None,
            last_known_seconds_remaining: seconds,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_camel_case_field_names() {
        let state = RunState {
            is_running: true,
            target_timestamp: Some(1_700_000_000_000),
            last_known_seconds_remaining: 1800,
        };
        let json = state.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"isRunning":true,"targetTimestamp":1700000000000,"lastKnownSecondsRemaining":1800}"#
        );
        assert_eq!(RunState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn null_target_reads_back_as_none() {
        let state =
            RunState::from_json(r#"{"isRunning":false,"targetTimestamp":null,"lastKnownSecondsRemaining":60}"#)
                .unwrap();
        assert_eq!(state, RunState::idle(60));
    }

    #[test]
    fn remaining_seconds_may_be_omitted() {
        let state = RunState::from_json(r#"{"isRunning":true,"targetTimestamp":1700000000000}"#).unwrap();
        assert!(state.is_running);
        assert_eq!(state.target_timestamp, Some(1_700_000_000_000));
        assert_eq!(state.last_known_seconds_remaining, 0);
    }

    #[test]
    fn rejects_missing_or_mistyped_fields() {
        assert!(RunState::from_json(r#"{"targetTimestamp":1700000000000}"#).is_err());
        assert!(RunState::from_json(r#"{"isRunning":"yes","lastKnownSecondsRemaining":1}"#).is_err());
        assert!(RunState::from_json(r#"{"isRunning":false,"lastKnownSecondsRemaining":-3}"#).is_err());
        assert!(RunState::from_json("not json").is_err());
    }
}
