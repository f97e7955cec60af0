//! External command helpers shared by the audio and keep-awake services

use std::process::Stdio;
use tokio::{
    process::{Child, Command},
    runtime::Handle,
};
use tracing::{debug, info, warn};

/// A program plus its arguments, parsed from a CLI string like `"espeak-ng -s 180"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split on whitespace; `None` for a blank string
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn command(&self, extra_arg: Option<&str>) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(arg) = extra_arg {
            command.arg(arg);
        }
        command
    }
}

/// Run a command to completion, appending `extra_arg` if given
pub async fn run_command(line: &CommandLine, extra_arg: Option<&str>) -> Result<(), String> {
    debug!("Running {}", line.program);

    let output = line
        .command(extra_arg)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", line.program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", line.program, stderr.trim()));
    }

    Ok(())
}

/// Run a command on the current runtime without waiting for it
pub fn run_detached(line: &CommandLine, extra_arg: Option<&str>) {
    let Ok(runtime) = Handle::try_current() else {
        warn!("No async runtime available, skipping {}", line.program);
        return;
    };

    let line = line.clone();
    let extra_arg = extra_arg.map(str::to_string);
    runtime.spawn(async move {
        if let Err(e) = run_command(&line, extra_arg.as_deref()).await {
            warn!("{}", e);
        }
    });
}

/// Start a long-running child that is killed when its handle is dropped
pub fn spawn_child(line: &CommandLine) -> Result<Child, String> {
    if Handle::try_current().is_err() {
        return Err(format!("No async runtime available to spawn {}", line.program));
    }

    let child = line
        .command(None)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("Failed to spawn {}: {}", line.program, e))?;

    info!("{} started (pid {:?})", line.program, child.id());
    Ok(child)
}

/// Whether a spawned child is still alive
pub fn child_is_running(child: &mut Child) -> bool {
    matches!(child.try_wait(), Ok(None))
}

/// Ask a child to exit; it is reaped in the background
pub fn stop_child(mut child: Child, name: &str) {
    if let Err(e) = child.start_kill() {
        debug!("{} already exited: {}", name, e);
    } else {
        info!("{} stopped", name);
    }
}

/// Check that a program can be executed at all
pub async fn check_program_available(program: &str) -> Result<(), String> {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|_| format!("{} is not available", program))?;
    Ok(())
}
