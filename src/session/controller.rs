//! Session controller
//!
//! Owns the configuration and run state, turns engine events into display
//! renders and announcements, and persists enough to resume after a restart.
//!
//! ```text
//! Idle --start--> Running --finish--> Alarm --stop/acknowledge--> Idle
//!                    |                  |
//!                    +-------stop-------+--> Idle        Alarm --start--> Running
//! ```
//!
//! All methods are synchronous. Side effects are fire-and-forget calls on the
//! injected [`SideEffects`]; the engine is driven through its command channel.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{ConfigError, SessionError},
    services::SideEffects,
    state::{
        display::{format_clock, progress_fraction},
        store::{KeyValueStore, CONFIG_KEY, RUN_STATE_KEY},
        ConfigStatus, DisplaySnapshot, RunState, SessionConfig, SessionPhase,
    },
    tasks::countdown_engine::{EngineEvent, EngineHandle},
    utils::clock::{remaining_seconds, Clock},
};

use super::checkpoints::{checkpoint_phrase, AnnouncementPolicy, CheckpointTracker};

/// Spoken when the countdown reaches zero
pub const FINISH_PHRASE: &str = "Time is up. Pencils down.";
/// Vibration length for a checkpoint alert
pub const CHECKPOINT_PULSE_MS: u64 = 500;

pub struct SessionController {
    config: SessionConfig,
    raw_config: String,
    run: RunState,
    phase: SessionPhase,
    status: ConfigStatus,
    pocket_mode: bool,
    /// Bumped on every engine start; events from older runs are dropped
    generation: u64,
    tracker: CheckpointTracker,
    engine: EngineHandle,
    effects: SideEffects,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    display: watch::Sender<DisplaySnapshot>,
    frame: u64,
}

impl SessionController {
    /// Create an idle controller with the built-in default configuration.
    ///
    /// Call [`restore`](Self::restore) before use to load persisted state.
    pub fn new(
        engine: EngineHandle,
        effects: SideEffects,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        policy: AnnouncementPolicy,
    ) -> Self {
        let config = SessionConfig::default();
        let run = RunState::idle(config.total_seconds());
        let (display, _) = watch::channel(DisplaySnapshot::default());

        let mut controller = Self {
            raw_config: String::new(),
            config,
            run,
            phase: SessionPhase::Idle,
            status: ConfigStatus::default(),
            pocket_mode: false,
            generation: 0,
            tracker: CheckpointTracker::new(policy),
            engine,
            effects,
            store,
            clock,
            display,
            frame: 0,
        };
        controller.display.send_replace(controller.snapshot());
        controller
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn raw_config(&self) -> &str {
        &self.raw_config
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn pocket_mode(&self) -> bool {
        self.pocket_mode
    }

    pub fn policy(&self) -> AnnouncementPolicy {
        self.tracker.policy()
    }

    /// Receive every render
    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display.subscribe()
    }

    /// The most recent render
    pub fn current_display(&self) -> DisplaySnapshot {
        self.display.borrow().clone()
    }

    // ── Startup ──────────────────────────────────────────────────────

    /// Load persisted configuration and run state, resuming a countdown that
    /// was active when the process went away.
    pub fn restore(&mut self, default_config: &str) {
        let raw = match self.store.get(CONFIG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => default_config.to_string(),
            Err(e) => {
                warn!("Failed to read saved configuration: {:#}", e);
                default_config.to_string()
            }
        };

        if self.apply(&raw, false).is_err() && raw != default_config {
            warn!("Saved configuration {:?} is invalid, using default", raw);
            if let Err(e) = self.apply(default_config, false) {
                warn!("Default configuration {:?} is invalid too: {}", default_config, e);
            }
        }

        let saved = match self.store.get(RUN_STATE_KEY) {
            Ok(Some(saved)) => saved,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read saved run state: {:#}", e);
                return;
            }
        };

        let state = match RunState::from_json(&saved) {
            Ok(state) => state,
            Err(e) => {
                warn!("Discarding unreadable run state: {}", e);
                return;
            }
        };

        match (state.is_running, state.target_timestamp) {
            (true, Some(target)) => {
                let remaining = remaining_seconds(target, self.clock.now_ms());
                if remaining > 0 {
                    info!("Resuming countdown with {} remaining", format_clock(remaining));
                    self.resume(target, remaining);
                } else {
                    info!("Countdown expired while the server was down");
                    self.run = RunState::idle(self.config.total_seconds());
                    self.raise_alarm();
                }
            }
            _ => {
                // A state saved without a remaining value keeps the full duration
                if state.last_known_seconds_remaining > 0 {
                    self.run.last_known_seconds_remaining = state.last_known_seconds_remaining;
                }
                debug!("Restored idle state at {}", format_clock(self.run.last_known_seconds_remaining));
                self.run.is_running = false;
                self.run.target_timestamp = None;
                self.render();
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the configuration from text like `"30, 15, 10, 5"`.
    ///
    /// Refused while a countdown or its alarm is active. A parse failure sets
    /// the error status line and keeps the previous configuration.
    pub fn apply_configuration(&mut self, raw: &str) -> Result<SessionConfig, ConfigError> {
        if self.phase.config_locked() {
            debug!("Ignoring configuration change while {:?}", self.phase);
            return Err(ConfigError::Locked);
        }
        self.apply(raw, true)
    }

    /// Begin (or continue) counting down from the displayed value.
    ///
    /// Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        if self.phase == SessionPhase::Running {
            debug!("Start ignored, countdown already running");
            return false;
        }

        let seconds = self.run.last_known_seconds_remaining;
        let target = self
            .clock
            .now_ms()
            .saturating_add((seconds as i64).saturating_mul(1000));

        info!("Starting countdown from {}", format_clock(seconds));
        self.arm(target, seconds);
        self.persist();
        self.render();
        true
    }

    /// Halt the countdown and release side effects. Returns `false` when idle.
    pub fn stop(&mut self) -> bool {
        if self.phase == SessionPhase::Idle {
            debug!("Stop ignored, already idle");
            return false;
        }

        info!("Stopping countdown at {}", format_clock(self.run.last_known_seconds_remaining));
        self.halt();
        self.persist();
        self.render();
        true
    }

    /// Dismiss a finished countdown's alarm
    pub fn acknowledge(&mut self) -> bool {
        if self.phase != SessionPhase::Alarm {
            return false;
        }
        self.stop()
    }

    /// Show the pocket overlay; only meaningful while counting down
    pub fn enter_pocket_mode(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Running {
            return Err(SessionError::NotRunning);
        }

        self.acquire_effects();
        if !self.pocket_mode {
            info!("Entering pocket mode");
            self.pocket_mode = true;
            self.render();
        }
        Ok(())
    }

    pub fn exit_pocket_mode(&mut self) -> bool {
        if !self.pocket_mode {
            return false;
        }
        info!("Leaving pocket mode");
        self.pocket_mode = false;
        self.render();
        true
    }

    /// Re-request keep-awake if it was lost while running.
    ///
    /// Returns `true` when a new request was made.
    pub fn refresh_keep_awake(&self) -> bool {
        if self.phase != SessionPhase::Running || self.effects.keep_awake.is_held() {
            return false;
        }

        info!("Keep-awake lost while running, requesting again");
        if let Err(e) = self.effects.keep_awake.acquire() {
            warn!("Keep-awake request failed: {}", e);
        }
        true
    }

    /// Release side effects and write the final state; a running countdown
    /// stays marked as running so the next start resumes it.
    pub fn shutdown(&mut self) {
        self.release_effects();
        self.persist();
        info!("Session controller shut down ({:?})", self.phase);
    }

    // ── Engine events ────────────────────────────────────────────────

    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Tick { seconds, generation } if generation == self.generation => {
                self.on_tick(seconds);
            }
            EngineEvent::Finish { generation } if generation == self.generation => {
                self.on_finish();
            }
            stale => debug!("Dropping stale engine event {:?}", stale),
        }
    }

    /// Render and check checkpoints, at most once per distinct value.
    ///
    /// Returns `true` when the tick changed the display.
    pub fn on_tick(&mut self, seconds: u64) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        if seconds == self.run.last_known_seconds_remaining {
            return false;
        }

        self.run.last_known_seconds_remaining = seconds;
        self.render();
        self.persist();
        self.check_announcements(seconds);
        true
    }

    /// The countdown reached zero
    pub fn on_finish(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            debug!("Finish ignored while {:?}", self.phase);
            return false;
        }

        self.halt();
        self.raise_alarm();
        true
    }

    // ── Internals ────────────────────────────────────────────────────

    fn apply(&mut self, raw: &str, persist_run: bool) -> Result<SessionConfig, ConfigError> {
        match SessionConfig::parse(raw) {
            Ok(config) => {
                if let Err(e) = self.store.set(CONFIG_KEY, raw) {
                    warn!("Failed to save configuration: {:#}", e);
                }
                self.status = ConfigStatus {
                    ok: true,
                    message: config.summary(),
                };
                info!("Configuration applied: {}", self.status.message);

                self.config = config;
                self.raw_config = raw.to_string();
                self.run.last_known_seconds_remaining = self.config.total_seconds();
                self.render();
                if persist_run {
                    self.persist();
                }
                Ok(self.config.clone())
            }
            Err(e) => {
                warn!("Rejected configuration {:?}", raw);
                self.status = ConfigStatus {
                    ok: false,
                    message: e.to_string(),
                };
                self.render();
                Err(e)
            }
        }
    }

    fn arm(&mut self, target: i64, seconds: u64) {
        self.generation += 1;
        self.run = RunState {
            is_running: true,
            target_timestamp: Some(target),
            last_known_seconds_remaining: seconds,
        };
        self.phase = SessionPhase::Running;
        self.tracker.arm(&self.config, seconds);
        self.acquire_effects();
        self.engine.start(target, self.generation);
    }

    fn resume(&mut self, target: i64, remaining: u64) {
        self.arm(target, remaining);
        self.persist();
        self.render();
    }

    fn halt(&mut self) {
        self.engine.stop();
        self.release_effects();
        self.pocket_mode = false;
        self.phase = SessionPhase::Idle;
        self.run.is_running = false;
        self.run.target_timestamp = None;
        self.tracker.disarm();
    }

    fn raise_alarm(&mut self) {
        self.run.last_known_seconds_remaining = self.config.total_seconds();
        self.phase = SessionPhase::Alarm;

        info!("Countdown finished");
        self.effects.announcer.tone();
        self.effects.announcer.speak(FINISH_PHRASE);

        self.persist();
        self.render();
    }

    fn check_announcements(&mut self, seconds: u64) {
        if let Some(minutes) = self.tracker.check(&self.config, seconds) {
            info!("Checkpoint: {} minutes remaining", minutes);
            self.effects.announcer.tone();
            self.effects.announcer.speak(&checkpoint_phrase(minutes));
            self.effects.haptics.pulse(CHECKPOINT_PULSE_MS);
        }
    }

    fn acquire_effects(&self) {
        self.effects.ambient.start();
        if let Err(e) = self.effects.keep_awake.acquire() {
            warn!("Keep-awake unavailable: {}", e);
        }
    }

    fn release_effects(&self) {
        self.effects.ambient.stop();
        self.effects.keep_awake.release();
    }

    fn snapshot(&self) -> DisplaySnapshot {
        let seconds = self.run.last_known_seconds_remaining;
        DisplaySnapshot {
            phase: self.phase,
            remaining_seconds: seconds,
            clock: format_clock(seconds),
            progress: progress_fraction(seconds, self.config.total_seconds()),
            total_minutes: self.config.total_minutes,
            checkpoints: self.config.checkpoints.clone(),
            status: self.status.clone(),
            config_locked: self.phase.config_locked(),
            alarm: self.phase == SessionPhase::Alarm,
            pocket_mode: self.pocket_mode,
            frame: self.frame,
        }
    }

    fn render(&mut self) {
        self.frame += 1;
        self.display.send_replace(self.snapshot());
    }

    fn persist(&self) {
        match self.run.to_json() {
            Ok(json) => {
                if let Err(e) = self.store.set(RUN_STATE_KEY, &json) {
                    warn!("Failed to save run state: {:#}", e);
                }
            }
            Err(e) => warn!("Failed to serialize run state: {}", e),
        }
    }
}
