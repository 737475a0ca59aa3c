use std::io;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::outcome::{LogoutFailure, LogoutOutcome};
use crate::domain::session::ActiveSession;

#[async_trait]
pub trait LogoutClient: Send + Sync {
    async fn logout(&self, session_id: &str) -> Result<(), LogoutFailure>;
}

// Local handoff slot written by the lab server.
pub trait MarkerReader {
    fn load(&self) -> io::Result<Option<ActiveSession>>;
    // Missing marker counts as removed.
    fn remove(&self) -> io::Result<()>;
}

// Append-only run history; write failures never abort a run.
pub trait DiagnosticLog {
    fn begin_run(&self);
    fn record(&self, line: &str);
}

// User-facing progress while the logout is in flight.
pub trait Notifier {
    fn show(&mut self, session: &ActiveSession);
    fn tick(&mut self, frame: usize);
    fn finish(&mut self, outcome: &LogoutOutcome);
    fn dismiss(&mut self);
}

#[async_trait]
impl<T: LogoutClient + ?Sized> LogoutClient for Arc<T> {
    async fn logout(&self, session_id: &str) -> Result<(), LogoutFailure> {
        (**self).logout(session_id).await
    }
}

impl<T: DiagnosticLog + ?Sized> DiagnosticLog for &T {
    fn begin_run(&self) {
        (**self).begin_run()
    }

    fn record(&self, line: &str) {
        (**self).record(line)
    }
}
