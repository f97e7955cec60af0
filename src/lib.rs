//! Proctor Clock - a countdown server for proctored exams
//! 
//! A background countdown engine reports remaining seconds over a channel;
//! the session controller turns those reports into display renders, spoken
//! checkpoint alerts, and persisted run state that survives a restart.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{ConfigError, SessionError};
pub use session::{AnnouncementPolicy, SessionController};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
