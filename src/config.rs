//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::{
    services::CommandLine,
    session::AnnouncementPolicy,
    state::DEFAULT_CONFIG_TEXT,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "proctor-clock")]
#[command(about = "A countdown server for proctored exams with spoken checkpoint alerts")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding the saved configuration and run state
    #[arg(long, default_value = ".proctor-clock")]
    pub state_dir: PathBuf,

    /// Configuration used until one is applied: total minutes, then checkpoint minutes
    #[arg(long, default_value = DEFAULT_CONFIG_TEXT)]
    pub default_config: String,

    /// Countdown engine tick interval in milliseconds
    #[arg(long, default_value = "250", value_parser = clap::value_parser!(u64).range(10..=1000))]
    pub tick_ms: u64,

    /// Command that speaks its last argument, e.g. "espeak-ng -s 180"
    #[arg(long)]
    pub speech_command: Option<String>,

    /// Command that plays the alert chime (terminal bell if unset)
    #[arg(long)]
    pub tone_command: Option<String>,

    /// Long-running command played quietly while counting down
    #[arg(long)]
    pub ambient_command: Option<String>,

    /// Do not hold a systemd-inhibit lock while counting down
    #[arg(long)]
    pub no_keep_awake: bool,

    /// Announce checkpoints whose exact minute tick was missed
    #[arg(long)]
    pub catch_up_checkpoints: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn announcement_policy(&self) -> AnnouncementPolicy {
        if self.catch_up_checkpoints {
            AnnouncementPolicy::CatchUp
        } else {
            AnnouncementPolicy::ExactMinute
        }
    }

    pub fn speech(&self) -> Option<CommandLine> {
        self.speech_command.as_deref().and_then(CommandLine::parse)
    }

    pub fn tone(&self) -> Option<CommandLine> {
        self.tone_command.as_deref().and_then(CommandLine::parse)
    }

    pub fn ambient(&self) -> Option<CommandLine> {
        self.ambient_command.as_deref().and_then(CommandLine::parse)
    }
}
