//! Side-effect capabilities the session controller depends on
//!
//! Every call is fire-and-forget. Implementations log their own failures and
//! never block the caller; the countdown is correct without any of them.

use std::sync::Arc;
use tracing::info;

/// Audible alerts: a short chime and synthesized speech
pub trait Announcer: Send + Sync {
    fn tone(&self);
    fn speak(&self, text: &str);
}

/// A quiet, continuous sound that keeps the audio output path awake
pub trait AmbientLoop: Send + Sync {
    fn start(&self);
    fn stop(&self);
}

/// Device vibration
pub trait HapticFeedback: Send + Sync {
    fn pulse(&self, duration_ms: u64);
}

/// A request that keeps the display (or host) from going to sleep
pub trait KeepAwake: Send + Sync {
    fn acquire(&self) -> Result<(), String>;
    fn release(&self);
    fn is_held(&self) -> bool;
}

/// The full set of collaborators injected into the controller
#[derive(Clone)]
pub struct SideEffects {
    pub announcer: Arc<dyn Announcer>,
    pub ambient: Arc<dyn AmbientLoop>,
    pub haptics: Arc<dyn HapticFeedback>,
    pub keep_awake: Arc<dyn KeepAwake>,
}

/// Accepts every call and does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEffects;

impl Announcer for NoopEffects {
    fn tone(&self) {}
    fn speak(&self, _text: &str) {}
}

impl AmbientLoop for NoopEffects {
    fn start(&self) {}
    fn stop(&self) {}
}

impl HapticFeedback for NoopEffects {
    fn pulse(&self, _duration_ms: u64) {}
}

impl KeepAwake for NoopEffects {
    fn acquire(&self) -> Result<(), String> {
        Ok(())
    }

    fn release(&self) {}

    fn is_held(&self) -> bool {
        true
    }
}

/// A host without a vibration motor: record the pulse in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHaptics;

impl HapticFeedback for LogHaptics {
    fn pulse(&self, duration_ms: u64) {
        info!("Vibrate {}ms", duration_ms);
    }
}
