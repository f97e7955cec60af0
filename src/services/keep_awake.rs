//! Keep-awake via a held `systemd-inhibit` lock

use std::sync::Mutex;
use tokio::process::Child;
use tracing::{debug, warn};

use super::{
    commands::{child_is_running, spawn_child, stop_child, CommandLine},
    effects::KeepAwake,
};

/// Holds an idle/sleep inhibitor for as long as the child process lives
#[derive(Debug)]
pub struct SystemdInhibitor {
    command: CommandLine,
    child: Mutex<Option<Child>>,
}

impl SystemdInhibitor {
    pub fn new(why: &str) -> Self {
        Self {
            command: CommandLine {
                program: "systemd-inhibit".to_string(),
                args: vec![
                    "--what=idle:sleep".to_string(),
                    "--who=proctor-clock".to_string(),
                    format!("--why={}", why),
                    "--mode=block".to_string(),
                    "sleep".to_string(),
                    "infinity".to_string(),
                ],
            },
            child: Mutex::new(None),
        }
    }
}

impl Default for SystemdInhibitor {
    fn default() -> Self {
        Self::new("Proctored countdown in progress")
    }
}

impl KeepAwake for SystemdInhibitor {
    fn acquire(&self) -> Result<(), String> {
        let mut slot = self
            .child
            .lock()
            .map_err(|e| format!("Failed to lock inhibitor state: {}", e))?;

        if let Some(child) = slot.as_mut() {
            if child_is_running(child) {
                debug!("Keep-awake already held");
                return Ok(());
            }
            warn!("Keep-awake lock was lost");
        }

        *slot = Some(spawn_child(&self.command)?);
        Ok(())
    }

    fn release(&self) {
        let child = match self.child.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                warn!("Failed to lock inhibitor state: {}", e);
                None
            }
        };
        if let Some(child) = child {
            stop_child(child, "keep-awake inhibitor");
        }
    }

    fn is_held(&self) -> bool {
        match self.child.lock() {
            Ok(mut slot) => slot.as_mut().map(child_is_running).unwrap_or(false),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inhibitor_wraps_sleep_infinity() {
        let inhibitor = SystemdInhibitor::new("exam");
        assert_eq!(inhibitor.command.program, "systemd-inhibit");
        assert!(inhibitor.command.args.contains(&"--why=exam".to_string()));
        assert_eq!(inhibitor.command.args.last().map(String::as_str), Some("infinity"));
        assert!(!inhibitor.is_held());
    }
}
