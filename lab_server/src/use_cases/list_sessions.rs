use crate::domain::entities::SessionRecord;
use crate::domain::errors::LabError;
use crate::domain::ports::{Clock, SessionStore};

// Admin view of the whole log, newest first.
pub struct SessionListing {
    pub total: usize,
    pub active: usize,
    // Check-ins on the current date.
    pub today: usize,
    pub records: Vec<SessionRecord>,
}

// Read-only listing use case with injected dependencies.
pub struct ListSessionsUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> ListSessionsUseCase<C, S>
where
    C: Clock,
    S: SessionStore,
{
    pub async fn execute(&self) -> Result<SessionListing, LabError> {
        let records = self.store.list().await?;
        let today = self.clock.now().date();

        Ok(SessionListing {
            total: records.len(),
            active: records.iter().filter(|record| record.is_active()).count(),
            today: records
                .iter()
                .filter(|record| record.checked_in_at.date() == today)
                .count(),
            records,
        })
    }
}
