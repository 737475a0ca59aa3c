use std::{env, path::PathBuf, time::Duration};

use crate::use_cases::logout_on_terminate::Timing;

pub const TICK_INTERVAL: Duration = Duration::from_millis(700);
pub const MIN_TICKS: usize = 3;
pub const DISMISS_DELAY: Duration = Duration::from_millis(500);
// Extra wait past the logout timeout before the UI loop stops.
pub const GIVE_UP_GRACE: Duration = Duration::from_secs(1);

pub fn server_url() -> String {
    env::var("LAB_SERVER_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

pub fn marker_path() -> PathBuf {
    env::var("LAB_MARKER_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("current_session.txt"))
}

pub fn shutdown_log_path() -> PathBuf {
    env::var("LAB_SHUTDOWN_LOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("shutdown_log.txt"))
}

pub fn logout_timeout() -> Duration {
    let millis = env::var("LAB_LOGOUT_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(5000);
    Duration::from_millis(millis)
}

pub fn ui_timing(logout_timeout: Duration) -> Timing {
    Timing {
        tick: TICK_INTERVAL,
        min_ticks: MIN_TICKS,
        dismiss_delay: DISMISS_DELAY,
        give_up_after: logout_timeout + GIVE_UP_GRACE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum NotifierKind {
    Modal,
    Console,
    #[value(name = "none")]
    Silent,
}

// Everything one watcher run needs, resolved from env and CLI flags.
#[derive(Debug, Clone)]
pub struct WatcherSettings {
    pub server_url: String,
    pub marker_path: PathBuf,
    pub log_path: PathBuf,
    pub logout_timeout: Duration,
    pub notifier: NotifierKind,
    pub timing: Timing,
}

impl WatcherSettings {
    pub fn from_env() -> Self {
        let logout_timeout = logout_timeout();
        Self {
            server_url: server_url(),
            marker_path: marker_path(),
            log_path: shutdown_log_path(),
            logout_timeout,
            notifier: NotifierKind::Modal,
            timing: ui_timing(logout_timeout),
        }
    }
}
