//! State management module
//! 
//! Configuration, persisted run state, the display snapshot, and the
//! shared application state handed to the HTTP layer.

pub mod app_state;
pub mod display;
pub mod run_state;
pub mod session_config;
pub mod store;

// Re-export main types
pub use app_state::AppState;
pub use display::{ConfigStatus, DisplaySnapshot, SessionPhase};
pub use run_state::RunState;
pub use session_config::{SessionConfig, DEFAULT_CONFIG_TEXT};
pub use store::{FileStore, KeyValueStore, MemoryStore};
