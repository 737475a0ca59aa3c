use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::outcome::{LogoutFailure, LogoutOutcome};
use crate::domain::ports::{DiagnosticLog, LogoutClient, MarkerReader, Notifier};
use crate::domain::session::ActiveSession;

pub(crate) fn test_session(session_id: &str) -> ActiveSession {
    ActiveSession {
        session_id: session_id.to_string(),
        register_no: Some("AB12CD34EF56".to_string()),
        name: Some("Test User".to_string()),
    }
}

// Client fake that answers every call with the same reply.
pub(crate) struct ScriptedClient {
    reply: Result<(), LogoutFailure>,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    pub(crate) fn replying(reply: Result<(), LogoutFailure>) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl LogoutClient for ScriptedClient {
    async fn logout(&self, session_id: &str) -> Result<(), LogoutFailure> {
        self.calls.lock().unwrap().push(session_id.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryMarker {
    session: Arc<Mutex<Option<ActiveSession>>>,
    unreadable: bool,
    fail_removal: bool,
}

impl MemoryMarker {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn holding(session: ActiveSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(session))),
            ..Self::default()
        }
    }

    pub(crate) fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_removal(mut self) -> Self {
        self.fail_removal = true;
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.session.lock().unwrap().is_none()
    }
}

impl MarkerReader for MemoryMarker {
    fn load(&self) -> io::Result<Option<ActiveSession>> {
        if self.unreadable {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    fn remove(&self) -> io::Result<()> {
        if self.fail_removal {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        self.session.lock().unwrap().take();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl DiagnosticLog for MemoryLog {
    fn begin_run(&self) {}

    fn record(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) events: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn show(&mut self, session: &ActiveSession) {
        self.events.push(format!("show {}", session.session_id));
    }

    fn tick(&mut self, frame: usize) {
        self.events.push(format!("tick {frame}"));
    }

    fn finish(&mut self, outcome: &LogoutOutcome) {
        self.events.push(format!("finish {}", outcome.status_line()));
    }

    fn dismiss(&mut self) {
        self.events.push("dismiss".to_string());
    }
}
