use async_trait::async_trait;
use chrono::{NaiveDateTime, Timelike};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::{RegistrationMode, SessionRecord, SessionStatus};
use crate::domain::errors::StoreError;
use crate::domain::ports::{Clock, MarkerStore, SessionStore};

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub marker: Arc<dyn MarkerStore>,
    pub clock: Arc<dyn Clock>,
    pub mode: RegistrationMode,
}

// Session store kept in process memory; route tests run against it in place
// of SQLite.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    pub records: Arc<Mutex<Vec<SessionRecord>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        push_unique(&mut records, record)
    }

    async fn insert_unless_active(&self, record: SessionRecord) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        if records
            .iter()
            .any(|r| r.register_no == record.register_no && r.is_active())
        {
            return Ok(false);
        }
        push_unique(&mut records, record)?;
        Ok(true)
    }

    async fn find_active_by_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .find(|r| r.session_id == session_id && r.is_active())
            .cloned())
    }

    async fn complete(
        &self,
        session_id: &str,
        checked_out_at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        match records
            .iter_mut()
            .find(|r| r.session_id == session_id && r.is_active())
        {
            Some(record) => {
                record.checked_out_at = Some(checked_out_at);
                record.status = SessionStatus::Completed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.iter().rev().cloned().collect())
    }
}

fn push_unique(records: &mut Vec<SessionRecord>, record: SessionRecord) -> Result<(), StoreError> {
    if records.iter().any(|r| r.session_id == record.session_id) {
        return Err(StoreError(format!(
            "duplicate session id {}",
            record.session_id
        )));
    }
    records.push(record);
    Ok(())
}

// Local wall clock; the lab log records local times.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = chrono::Local::now().naive_local();
        // Second precision matches the stored HH:MM:SS columns.
        now.with_nanosecond(0).unwrap_or(now)
    }
}
