//! Chime, speech and ambient loop backed by external commands

use std::{
    io::Write,
    sync::Mutex,
};
use tokio::process::Child;
use tracing::{info, warn};

use super::{
    commands::{child_is_running, run_detached, spawn_child, stop_child, CommandLine},
    effects::{AmbientLoop, Announcer},
};

/// Plays the chime and speaks announcements through configured commands.
///
/// Without a tone command the terminal bell is rung; without a speech command
/// the phrase is only logged.
#[derive(Debug, Clone, Default)]
pub struct CommandAnnouncer {
    tone: Option<CommandLine>,
    speech: Option<CommandLine>,
}

impl CommandAnnouncer {
    pub fn new(tone: Option<CommandLine>, speech: Option<CommandLine>) -> Self {
        Self { tone, speech }
    }
}

impl Announcer for CommandAnnouncer {
    fn tone(&self) {
        match &self.tone {
            Some(line) => run_detached(line, None),
            None => {
                let mut stdout = std::io::stdout();
                if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
                    warn!("Failed to ring terminal bell: {}", e);
                }
            }
        }
    }

    fn speak(&self, text: &str) {
        info!("Announcement: {}", text);
        if let Some(line) = &self.speech {
            run_detached(line, Some(text));
        }
    }
}

/// Keeps one instance of the ambient command running between `start` and `stop`
#[derive(Debug, Default)]
pub struct CommandAmbientLoop {
    command: Option<CommandLine>,
    child: Mutex<Option<Child>>,
}

impl CommandAmbientLoop {
    pub fn new(command: Option<CommandLine>) -> Self {
        Self {
            command,
            child: Mutex::new(None),
        }
    }
}

impl AmbientLoop for CommandAmbientLoop {
    fn start(&self) {
        let Some(line) = &self.command else {
            return;
        };
        let Ok(mut slot) = self.child.lock() else {
            warn!("Failed to lock ambient loop state");
            return;
        };

        if let Some(child) = slot.as_mut() {
            if child_is_running(child) {
                return;
            }
        }

        match spawn_child(line) {
            Ok(child) => *slot = Some(child),
            Err(e) => warn!("Ambient loop unavailable: {}", e),
        }
    }

    fn stop(&self) {
        let child = match self.child.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                warn!("Failed to lock ambient loop state: {}", e);
                None
            }
        };
        if let Some(child) = child {
            stop_child(child, "ambient loop");
        }
    }
}
