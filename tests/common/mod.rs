//! Shared test helpers: recording side effects, clocks and a controller harness

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use proctor_clock::{
    services::{AmbientLoop, Announcer, HapticFeedback, KeepAwake, SideEffects},
    session::{AnnouncementPolicy, SessionController},
    state::{KeyValueStore, MemoryStore},
    tasks::{EngineCommand, EngineHandle},
    utils::{Clock, ManualClock},
};
use tokio::sync::mpsc;

/// Fixed wall-clock origin for deterministic tests
pub const EPOCH_MS: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Tone,
    Speak(String),
    Pulse(u64),
    AmbientStart,
    AmbientStop,
    KeepAwakeAcquire,
    KeepAwakeRelease,
}

/// Records every side-effect call in order
#[derive(Debug, Default)]
pub struct Recorder {
    log: Mutex<Vec<Effect>>,
    keep_awake_held: AtomicBool,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn side_effects(self: &Arc<Self>) -> SideEffects {
        SideEffects {
            announcer: self.clone(),
            ambient: self.clone(),
            haptics: self.clone(),
            keep_awake: self.clone(),
        }
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.log.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    pub fn spoken(&self) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Speak(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Simulate the host revoking the keep-awake lock
    pub fn lose_keep_awake(&self) {
        self.keep_awake_held.store(false, Ordering::SeqCst);
    }

    fn record(&self, effect: Effect) {
        self.log.lock().unwrap().push(effect);
    }
}

impl Announcer for Recorder {
    fn tone(&self) {
        self.record(Effect::Tone);
    }

    fn speak(&self, text: &str) {
        self.record(Effect::Speak(text.to_string()));
    }
}

impl AmbientLoop for Recorder {
    fn start(&self) {
        self.record(Effect::AmbientStart);
    }

    fn stop(&self) {
        self.record(Effect::AmbientStop);
    }
}

impl HapticFeedback for Recorder {
    fn pulse(&self, duration_ms: u64) {
        self.record(Effect::Pulse(duration_ms));
    }
}

impl KeepAwake for Recorder {
    fn acquire(&self) -> Result<(), String> {
        self.record(Effect::KeepAwakeAcquire);
        self.keep_awake_held.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) {
        self.record(Effect::KeepAwakeRelease);
        self.keep_awake_held.store(false, Ordering::SeqCst);
    }

    fn is_held(&self) -> bool {
        self.keep_awake_held.load(Ordering::SeqCst)
    }
}

/// Wall clock that follows tokio's (possibly paused) time
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
    epoch_ms: i64,
}

impl TokioClock {
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            origin: tokio::time::Instant::now(),
            epoch_ms,
        }
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        self.epoch_ms + self.origin.elapsed().as_millis() as i64
    }
}

/// A controller wired to recording effects, an in-memory store, a manual
/// clock and a bare engine command channel
pub struct Harness {
    pub controller: SessionController,
    pub commands: mpsc::UnboundedReceiver<EngineCommand>,
    pub clock: ManualClock,
    pub store: Arc<MemoryStore>,
    pub recorder: Arc<Recorder>,
}

impl Harness {
    /// Fresh controller with default configuration, already restored
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new(), AnnouncementPolicy::ExactMinute)
    }

    /// Controller restored from `store`
    pub fn with_store(store: MemoryStore, policy: AnnouncementPolicy) -> Self {
        let (tx, commands) = mpsc::unbounded_channel();
        let clock = ManualClock::new(EPOCH_MS);
        let store = Arc::new(store);
        let recorder = Recorder::new();

        let mut controller = SessionController::new(
            EngineHandle::new(tx),
            recorder.side_effects(),
            store.clone() as Arc<dyn KeyValueStore>,
            Arc::new(clock.clone()),
            policy,
        );
        controller.restore("30, 15, 10, 5");

        Self {
            controller,
            commands,
            clock,
            store,
            recorder,
        }
    }

    pub fn drain_commands(&mut self) -> Vec<EngineCommand> {
        let mut drained = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            drained.push(command);
        }
        drained
    }

    pub fn saved(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap()
    }

    pub fn frame(&self) -> u64 {
        self.controller.current_display().frame
    }
}
