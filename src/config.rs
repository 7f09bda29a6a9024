//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::{Parser, ValueEnum};

/// Where break notifications are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierKind {
    /// Desktop notification with a snooze action
    Desktop,
    /// Log line only, for headless machines
    Log,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "take-a-break")]
#[command(about = "A background service that reminds you to take regular breaks")]
#[command(version)]
pub struct Config {
    /// Port of the settings and control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Settings file holding the break interval and snooze deadline
    #[arg(short, long, default_value = "take-a-break.json")]
    pub settings: PathBuf,

    /// JSON file with the suggested break activities
    #[arg(short, long, default_value = "assets/activities.json")]
    pub activities: PathBuf,

    /// Icon shown on break notifications
    #[arg(long, default_value = "alarm-clock")]
    pub icon: String,

    /// Notification surface
    #[arg(short, long, value_enum, default_value_t = NotifierKind::Desktop)]
    pub notifier: NotifierKind,

    /// Seconds per timer tick; a tick counts as one minute of activity
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_seconds: u64,

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

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.tick_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["take-a-break"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.settings, PathBuf::from("take-a-break.json"));
        assert_eq!(config.notifier, NotifierKind::Desktop);
        assert_eq!(config.tick_period(), Duration::from_secs(60));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "take-a-break",
            "--notifier",
            "log",
            "--tick-seconds",
            "1",
            "--port",
            "8080",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.notifier, NotifierKind::Log);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_zero_tick_seconds_rejected() {
        let result = Config::try_parse_from(["take-a-break", "--tick-seconds", "0"]);
        assert!(result.is_err());
    }
}
