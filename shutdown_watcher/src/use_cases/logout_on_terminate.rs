use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::domain::outcome::{LogoutFailure, LogoutOutcome};
use crate::domain::ports::{DiagnosticLog, LogoutClient, MarkerReader, Notifier};

// Pacing of the notifier loop on the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub tick: Duration,
    pub min_ticks: usize,
    pub dismiss_delay: Duration,
    // Hard stop for the loop even when the logout call never returns.
    pub give_up_after: Duration,
}

pub struct LogoutOnTerminate<M, C: ?Sized, L> {
    pub marker: M,
    pub client: Arc<C>,
    pub log: L,
    pub timing: Timing,
}

impl<M, C, L> LogoutOnTerminate<M, C, L>
where
    M: MarkerReader,
    C: LogoutClient + ?Sized + 'static,
    L: DiagnosticLog,
{
    pub fn execute(&self, notifier: &mut dyn Notifier) -> LogoutOutcome {
        self.log.begin_run();
        self.log.record("Shutdown watcher triggered");

        let session = match self.marker.load() {
            Ok(Some(session)) => session,
            Ok(None) => return self.no_session(),
            Err(e) => {
                warn!(error = %e, "failed to read session marker");
                self.log.record(&format!("Could not read session marker: {e}"));
                return self.no_session();
            }
        };

        info!(session_id = %session.session_id, "active session found");
        self.log.record(&format!("Session: {}", session.describe()));
        notifier.show(&session);

        let pending = spawn_logout(self.client.clone(), session.session_id.clone());
        let outcome = self.wait_for(&pending, notifier);

        if outcome.clears_marker() {
            if let Err(e) = self.marker.remove() {
                warn!(error = %e, "failed to remove session marker");
                self.log.record(&format!("Could not remove session marker: {e}"));
            }
        }

        notifier.finish(&outcome);
        thread::sleep(self.timing.dismiss_delay);
        notifier.dismiss();

        info!(?outcome, "shutdown logout finished");
        self.log.record(&outcome.summary());
        outcome
    }

    fn no_session(&self) -> LogoutOutcome {
        info!("no active session");
        let outcome = LogoutOutcome::NoSession;
        self.log.record(&outcome.summary());
        outcome
    }

    fn wait_for(&self, pending: &PendingLogout, notifier: &mut dyn Notifier) -> LogoutOutcome {
        let started = Instant::now();
        let mut frame = 0;
        loop {
            notifier.tick(frame);
            frame += 1;
            if pending.is_done() && frame >= self.timing.min_ticks {
                break;
            }
            if started.elapsed() >= self.timing.give_up_after {
                break;
            }
            thread::sleep(self.timing.tick);
        }

        match pending.take() {
            Some(reply) => reply.into(),
            None => LogoutOutcome::Failed {
                reason: "timed out waiting for the server".to_string(),
            },
        }
    }
}

// Reply slot shared with the background logout thread.
#[derive(Default)]
struct PendingLogout {
    done: AtomicBool,
    reply: Mutex<Option<Result<(), LogoutFailure>>>,
}

impl PendingLogout {
    fn complete(&self, reply: Result<(), LogoutFailure>) {
        *self.reply.lock().unwrap_or_else(PoisonError::into_inner) = Some(reply);
        self.done.store(true, Ordering::Release);
    }

    fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    fn take(&self) -> Option<Result<(), LogoutFailure>> {
        self.reply
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

// The call gets its own thread and runtime; the caller keeps the UI loop.
fn spawn_logout<C>(client: Arc<C>, session_id: String) -> Arc<PendingLogout>
where
    C: LogoutClient + ?Sized + 'static,
{
    let pending = Arc::new(PendingLogout::default());
    let shared = pending.clone();

    let spawned = thread::Builder::new()
        .name("shutdown-logout".to_string())
        .spawn(move || {
            let reply = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(client.logout(&session_id)),
                Err(e) => Err(LogoutFailure::Other(format!(
                    "failed to start logout runtime: {e}"
                ))),
            };
            shared.complete(reply);
        });

    if let Err(e) = spawned {
        pending.complete(Err(LogoutFailure::Other(format!(
            "failed to spawn logout thread: {e}"
        ))));
    }
    pending
}
