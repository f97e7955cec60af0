//! Error types surfaced by the session controller

use thiserror::Error;

/// Status line shown when a configuration string cannot be used
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format. Try: 30, 15, 10, 5";

/// Rejections from `apply_configuration`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The text yielded no positive integers
    #[error("{}", INVALID_FORMAT_MESSAGE)]
    InvalidFormat,

    /// A countdown is active (or its alarm has not been acknowledged)
    #[error("configuration is locked while a countdown is active")]
    Locked,
}

/// Rejections from session operations other than configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please START the timer first.")]
    NotRunning,
}
