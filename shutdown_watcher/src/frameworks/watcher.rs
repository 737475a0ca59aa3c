// Framework bootstrap for the shutdown watcher.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::domain::outcome::LogoutOutcome;
use crate::domain::ports::{DiagnosticLog, Notifier};
use crate::frameworks::config::{NotifierKind, WatcherSettings};
use crate::interface_adapters::client::LabClient;
use crate::interface_adapters::diagnostic_log::FileDiagnosticLog;
use crate::interface_adapters::marker_file::FileMarkerReader;
use crate::interface_adapters::notifiers::{ConsoleNotifier, ModalNotifier, NoopNotifier};
use crate::use_cases::logout_on_terminate::LogoutOnTerminate;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to wait for termination signal: {0}")]
    Signal(#[source] io::Error),
}

// Logs go to stderr so stdout stays free for the console notifier.
pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn build_notifier(kind: NotifierKind) -> Box<dyn Notifier> {
    match kind {
        NotifierKind::Modal => Box::new(ModalNotifier::new()),
        NotifierKind::Console => Box::new(ConsoleNotifier::stdout()),
        NotifierKind::Silent => Box::new(NoopNotifier),
    }
}

/// Runs the shutdown logout once.
///
/// Errors and panics are caught and appended to the diagnostic log as
/// `ERROR: ...`; `None` means the run was aborted that way.
pub fn run_once(settings: &WatcherSettings) -> Option<LogoutOutcome> {
    let log = FileDiagnosticLog::new(&settings.log_path);
    guarded(&log, || execute(settings, &log))
}

/// Blocks until a termination signal arrives, then runs the logout once.
pub fn watch(settings: &WatcherSettings) -> Option<LogoutOutcome> {
    let log = FileDiagnosticLog::new(&settings.log_path);
    info!("waiting for termination signal");
    match wait_for_termination() {
        Ok(signal) => info!(signal, "termination signal received"),
        Err(e) => {
            report(&log, &e.to_string());
            return None;
        }
    }
    run_once(settings)
}

fn execute(
    settings: &WatcherSettings,
    log: &FileDiagnosticLog,
) -> Result<LogoutOutcome, WatcherError> {
    let client = LabClient::new(settings.server_url.clone(), settings.logout_timeout)?;
    let use_case = LogoutOnTerminate {
        marker: FileMarkerReader::new(&settings.marker_path),
        client: Arc::new(client),
        log,
        timing: settings.timing,
    };

    let mut notifier = build_notifier(settings.notifier);
    Ok(use_case.execute(notifier.as_mut()))
}

fn guarded<L, F>(log: &L, run: F) -> Option<LogoutOutcome>
where
    L: DiagnosticLog,
    F: FnOnce() -> Result<LogoutOutcome, WatcherError>,
{
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(outcome)) => Some(outcome),
        Ok(Err(e)) => {
            report(log, &e.to_string());
            None
        }
        Err(payload) => {
            report(log, &panic_message(payload.as_ref()));
            None
        }
    }
}

fn report<L: DiagnosticLog>(log: &L, message: &str) {
    error!(error = %message, "shutdown watcher run failed");
    log.record(&format!("ERROR: {message}"));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

fn wait_for_termination() -> Result<&'static str, WatcherError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WatcherError::Signal)?;

    runtime
        .block_on(termination_signal())
        .map_err(WatcherError::Signal)
}

#[cfg(unix)]
async fn termination_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "ctrl-c"),
        _ = terminate.recv() => Ok("SIGTERM"),
        _ = hangup.recv() => Ok("SIGHUP"),
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
}
