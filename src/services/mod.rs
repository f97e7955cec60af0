//! Side-effect services module
//! 
//! Capability traits the session controller calls into, and the
//! command-backed implementations used by the daemon.

pub mod audio;
pub mod commands;
pub mod effects;
pub mod keep_awake;

// Re-export main items
pub use audio::{CommandAmbientLoop, CommandAnnouncer};
pub use commands::{check_program_available, CommandLine};
pub use effects::{
    AmbientLoop, Announcer, HapticFeedback, KeepAwake, LogHaptics, NoopEffects, SideEffects,
};
pub use keep_awake::SystemdInhibitor;
