//! Countdown engine background task
//!
//! The engine owns only an absolute target instant. Every tick recomputes the
//! remaining time from the wall clock, so late, skipped or coalesced ticks
//! correct themselves instead of drifting. It knows nothing about
//! checkpoints, the display or audio; it just reports seconds.

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, Interval, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::utils::clock::{remaining_seconds, Clock};

/// Default tick cadence, well under a second so no whole-second value is missed
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Controller to engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Replace any running countdown with one ending at `target_epoch_ms`
    Start { target_epoch_ms: i64, generation: u64 },
    Stop,
}

/// Engine to controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Tick { seconds: u64, generation: u64 },
    /// Sent once, right after the first zero tick
    Finish { generation: u64 },
}

/// Sending side of the engine's command channel
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(commands: mpsc::UnboundedSender<EngineCommand>) -> Self {
        Self { commands }
    }

    pub fn start(&self, target_epoch_ms: i64, generation: u64) {
        self.send(EngineCommand::Start {
            target_epoch_ms,
            generation,
        });
    }

    pub fn stop(&self) {
        self.send(EngineCommand::Stop);
    }

    fn send(&self, command: EngineCommand) {
        if self.commands.send(command).is_err() {
            debug!("Countdown engine is gone, dropping {:?}", command);
        }
    }
}

/// The armed countdown, present only between `Start` and `Stop`/finish
struct Countdown {
    target_epoch_ms: i64,
    generation: u64,
    ticker: Interval,
}

/// Spawn the engine task and return its handle and event stream
pub fn spawn_countdown_engine(
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
) -> (EngineHandle, mpsc::UnboundedReceiver<EngineEvent>, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(countdown_engine_task(clock, tick_interval, command_rx, event_tx));
    (EngineHandle::new(command_tx), event_rx, task)
}

/// Run the engine until the command channel closes or nobody listens for events
pub async fn countdown_engine_task(
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    mut commands: mpsc::UnboundedReceiver<EngineCommand>,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    info!("Starting countdown engine ({}ms ticks)", tick_interval.as_millis());

    let mut countdown: Option<Countdown> = None;

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(EngineCommand::Start { target_epoch_ms, generation }) => {
                        debug!("Engine armed for {} (generation {})", target_epoch_ms, generation);
                        let mut ticker = interval(tick_interval);
                        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                        countdown = Some(Countdown { target_epoch_ms, generation, ticker });
                    }
                    Some(EngineCommand::Stop) => {
                        if countdown.take().is_some() {
                            debug!("Engine stopped");
                        }
                    }
                    None => break,
                }
            }

            Some((seconds, generation)) = next_tick(&mut countdown, clock.as_ref()) => {
                if events.send(EngineEvent::Tick { seconds, generation }).is_err() {
                    break;
                }
                if seconds == 0 {
                    countdown = None;
                    debug!("Countdown reached zero (generation {})", generation);
                    if events.send(EngineEvent::Finish { generation }).is_err() {
                        break;
                    }
                }
            }
        }
    }

    info!("Countdown engine stopped");
}

/// Wait for the next scheduled tick; pends forever while disarmed
async fn next_tick(countdown: &mut Option<Countdown>, clock: &dyn Clock) -> Option<(u64, u64)> {
    match countdown {
        Some(active) => {
            active.ticker.tick().await;
            let seconds = remaining_seconds(active.target_epoch_ms, clock.now_ms());
            Some((seconds, active.generation))
        }
        None => std::future::pending().await,
    }
}
