// Why the logout call did not close the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutFailure {
    // The server no longer knows the session as active.
    NotFound,
    Other(String),
}

// Result of one watcher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    NoSession,
    LoggedOut,
    AlreadyClosed,
    Failed { reason: String },
}

impl LogoutOutcome {
    // The marker is only dropped once the server agrees the session is closed.
    pub fn clears_marker(&self) -> bool {
        matches!(self, LogoutOutcome::LoggedOut | LogoutOutcome::AlreadyClosed)
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            LogoutOutcome::NoSession => "No active session",
            LogoutOutcome::LoggedOut => "Logout successful!",
            LogoutOutcome::AlreadyClosed => "Session was already logged out",
            LogoutOutcome::Failed { .. } => "Logout failed - please check manually",
        }
    }

    // Line written to the diagnostic log.
    pub fn summary(&self) -> String {
        match self {
            LogoutOutcome::NoSession => "No active session".to_string(),
            LogoutOutcome::LoggedOut => "Result: SUCCESS".to_string(),
            LogoutOutcome::AlreadyClosed => "Result: ALREADY LOGGED OUT".to_string(),
            LogoutOutcome::Failed { reason } => format!("Result: FAILED ({reason})"),
        }
    }
}

impl From<Result<(), LogoutFailure>> for LogoutOutcome {
    fn from(reply: Result<(), LogoutFailure>) -> Self {
        match reply {
            Ok(()) => LogoutOutcome::LoggedOut,
            Err(LogoutFailure::NotFound) => LogoutOutcome::AlreadyClosed,
            Err(LogoutFailure::Other(reason)) => LogoutOutcome::Failed { reason },
        }
    }
}
