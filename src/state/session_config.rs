//! Session configuration: total duration and checkpoint minutes

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Raw configuration used when nothing has been persisted yet
pub const DEFAULT_CONFIG_TEXT: &str = "30, 15, 10, 5";

/// Total countdown length plus the minute marks that trigger an announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub total_minutes: u32,
    /// Strictly less than `total_minutes`, in entry order, no duplicates
    pub checkpoints: Vec<u32>,
}

impl SessionConfig {
    /// Parse a comma-separated list such as `"30, 15, 10, 5"`.
    ///
    /// Items are read leniently: leading whitespace and sign, then as many
    /// digits as are present. Items that are not numbers or not positive are
    /// dropped. The first surviving number is the total; later numbers at or
    /// above the total are discarded. Checkpoints form a set, so a repeated
    /// minute is kept once and the summary lists it once (`"20, 5, 5"` gives
    /// `Alerts: 5`).
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let numbers: Vec<u32> = raw
            .split(',')
            .filter_map(parse_leading_int)
            .filter(|n| *n > 0)
            .filter_map(|n| u32::try_from(n).ok())
            .collect();

        let (&total_minutes, rest) = numbers.split_first().ok_or(ConfigError::InvalidFormat)?;

        let mut checkpoints = Vec::new();
        for &minute in rest {
            if minute < total_minutes && !checkpoints.contains(&minute) {
                checkpoints.push(minute);
            }
        }

        Ok(Self {
            total_minutes,
            checkpoints,
        })
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.total_minutes) * 60
    }

    pub fn is_checkpoint(&self, minute: u64) -> bool {
        self.checkpoints.iter().any(|&m| u64::from(m) == minute)
    }

    /// Status line shown after a successful apply
    pub fn summary(&self) -> String {
        let alerts = if self.checkpoints.is_empty() {
            "None".to_string()
        } else {
            self.checkpoints
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("Total: {}m | Alerts: {}", self.total_minutes, alerts)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_minutes: 30,
            checkpoints: vec![15, 10, 5],
        }
    }
}

/// Leading-integer parse: `" 12abc"` is 12, `"3.7"` is 3, `"abc"` is nothing
fn parse_leading_int(item: &str) -> Option<i64> {
    let trimmed = item.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Overlong digit runs saturate rather than fail
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
