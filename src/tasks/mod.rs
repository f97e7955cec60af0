//! Background tasks module
//! 
//! The countdown engine and the tasks that connect it, and the keep-awake
//! lock, to the session controller.

pub mod countdown_engine;
pub mod engine_events;
pub mod keep_awake_watchdog;

// Re-export main items
pub use countdown_engine::{
    spawn_countdown_engine, EngineCommand, EngineEvent, EngineHandle, DEFAULT_TICK_INTERVAL,
};
pub use engine_events::engine_event_task;
pub use keep_awake_watchdog::{keep_awake_watchdog_task, KEEP_AWAKE_CHECK_INTERVAL};
