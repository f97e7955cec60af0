//! Session control: the state machine between the countdown engine and
//! everything the user sees and hears.

pub mod checkpoints;
pub mod controller;

pub use checkpoints::{checkpoint_phrase, AnnouncementPolicy, CheckpointTracker};
pub use controller::{SessionController, CHECKPOINT_PULSE_MS, FINISH_PHRASE};
