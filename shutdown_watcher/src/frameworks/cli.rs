use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::frameworks::config::{NotifierKind, WatcherSettings, ui_timing};

#[derive(Debug, Parser)]
#[command(name = "lab-shutdown-watcher")]
#[command(about = "Closes the active lab session when this machine shuts down")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// How to show progress while logging out
    #[arg(long, global = true, value_enum, default_value_t = NotifierKind::Modal)]
    pub notifier: NotifierKind,

    /// Lab server base URL (overrides LAB_SERVER_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Session marker file (overrides LAB_MARKER_PATH)
    #[arg(long, global = true)]
    pub marker: Option<PathBuf>,

    /// Diagnostic log file (overrides LAB_SHUTDOWN_LOG_PATH)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Logout request timeout in milliseconds (overrides LAB_LOGOUT_TIMEOUT_MS)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Log out the active session once; meant for a shutdown hook
    Run,
    /// Wait for SIGTERM, SIGHUP or Ctrl-C, then log out
    Watch,
}

impl Cli {
    // Flags win over the environment.
    pub fn settings(&self, mut settings: WatcherSettings) -> WatcherSettings {
        if let Some(server) = &self.server {
            settings.server_url = server.clone();
        }
        if let Some(marker) = &self.marker {
            settings.marker_path = marker.clone();
        }
        if let Some(log_file) = &self.log_file {
            settings.log_path = log_file.clone();
        }
        if let Some(millis) = self.timeout_ms {
            settings.logout_timeout = std::time::Duration::from_millis(millis);
            settings.timing = ui_timing(settings.logout_timeout);
        }
        settings.notifier = self.notifier;
        settings
    }
}
