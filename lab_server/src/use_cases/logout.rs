use chrono::NaiveDateTime;
use tracing::warn;

use crate::domain::entities::RegistrationMode;
use crate::domain::errors::{LabError, ValidationError};
use crate::domain::ports::{Clock, MarkerStore, SessionStore};

// Response returned by the logout use case.
pub struct LogoutResponse {
    pub session_id: String,
    pub checked_out_at: NaiveDateTime,
    pub marker_cleared: bool,
}

// Logout use case with injected dependencies.
pub struct LogoutUseCase<C, S, M> {
    pub clock: C,
    pub store: S,
    pub marker: M,
    pub mode: RegistrationMode,
}

impl<C, S, M> LogoutUseCase<C, S, M>
where
    C: Clock,
    S: SessionStore,
    M: MarkerStore,
{
    pub async fn execute(&self, session_id: String) -> Result<LogoutResponse, LabError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(ValidationError::SessionId.into());
        }

        let record = self
            .store
            .find_active_by_id(session_id)
            .await?
            .ok_or(LabError::NotFound)?;

        // Never record a check-out earlier than the check-in.
        let checked_out_at = self.clock.now().max(record.checked_in_at);

        // The update is conditional on the record still being active.
        if !self.store.complete(session_id, checked_out_at).await? {
            return Err(LabError::NotFound);
        }

        let marker_cleared = self.clear_marker(session_id).await;

        Ok(LogoutResponse {
            session_id: session_id.to_string(),
            checked_out_at,
            marker_cleared,
        })
    }

    async fn clear_marker(&self, session_id: &str) -> bool {
        if !self.mode.clears_marker_unconditionally() {
            match self.marker.read().await {
                Ok(Some(marker)) if marker.session_id == session_id => {}
                Ok(_) => return false,
                Err(err) => {
                    warn!(error = %err, %session_id, "failed to read session marker");
                    return false;
                }
            }
        }

        match self.marker.clear().await {
            Ok(cleared) => cleared,
            Err(err) => {
                warn!(error = %err, %session_id, "failed to clear session marker");
                false
            }
        }
    }
}
