use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::entities::{SessionMarker, SessionRecord, SessionStatus};
use crate::domain::errors::StoreError;
use crate::domain::ports::{Clock, MarkerStore, SessionStore};

pub(crate) fn at(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .expect("valid test timestamp")
}

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub insert: bool,
    pub find: bool,
    pub complete: bool,
    pub list: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingStore {
    records: Arc<Mutex<Vec<SessionRecord>>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_record(&self, record: SessionRecord) {
        let mut guard = self.records.lock().expect("records mutex poisoned");
        guard.push(record);
    }

    pub(crate) fn records(&self) -> Vec<SessionRecord> {
        let guard = self.records.lock().expect("records mutex poisoned");
        guard.clone()
    }

    pub(crate) fn get_test_record(&self, session_id: &str) -> Option<SessionRecord> {
        self.records()
            .into_iter()
            .find(|record| record.session_id == session_id)
    }
}

pub(crate) fn active_record(
    session_id: &str,
    register_no: &str,
    checked_in_at: NaiveDateTime,
) -> SessionRecord {
    SessionRecord {
        session_id: session_id.to_string(),
        register_no: register_no.to_string(),
        name: "Test User".to_string(),
        department: "CS".to_string(),
        system_no: "Lab1".to_string(),
        checked_in_at,
        checked_out_at: None,
        status: SessionStatus::Active,
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError> {
        if self.failures.insert {
            return Err(StoreError("insert failed".to_string()));
        }

        let mut guard = self.records.lock().expect("records mutex poisoned");
        guard.push(record);
        Ok(())
    }

    async fn find_active_by_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        if self.failures.find {
            return Err(StoreError("find failed".to_string()));
        }

        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| record.session_id == session_id && record.is_active())
            .cloned())
    }

    async fn insert_unless_active(&self, record: SessionRecord) -> Result<bool, StoreError> {
        if self.failures.find {
            return Err(StoreError("active lookup failed".to_string()));
        }
        if self.failures.insert {
            return Err(StoreError("insert failed".to_string()));
        }

        let mut guard = self.records.lock().expect("records mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.register_no == record.register_no && existing.is_active())
        {
            return Ok(false);
        }
        guard.push(record);
        Ok(true)
    }

    async fn complete(
        &self,
        session_id: &str,
        checked_out_at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        if self.failures.complete {
            return Err(StoreError("complete failed".to_string()));
        }

        let mut guard = self.records.lock().expect("records mutex poisoned");
        match guard
            .iter_mut()
            .find(|record| record.session_id == session_id && record.is_active())
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
        if self.failures.list {
            return Err(StoreError("list failed".to_string()));
        }

        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard.iter().rev().cloned().collect())
    }
}

// Marker slot kept in memory; `fail` makes every call error.
#[derive(Clone, Default)]
pub(crate) struct MemoryMarker {
    content: Arc<Mutex<Option<String>>>,
    pub fail: bool,
}

impl MemoryMarker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn raw(&self) -> Option<String> {
        self.content.lock().expect("marker mutex poisoned").clone()
    }

    pub(crate) fn set_raw(&self, value: &str) {
        *self.content.lock().expect("marker mutex poisoned") = Some(value.to_string());
    }
}

#[async_trait]
impl MarkerStore for MemoryMarker {
    async fn write(&self, content: String) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError("marker write failed".to_string()));
        }
        *self.content.lock().expect("marker mutex poisoned") = Some(content);
        Ok(())
    }

    async fn read(&self) -> Result<Option<SessionMarker>, StoreError> {
        if self.fail {
            return Err(StoreError("marker read failed".to_string()));
        }
        Ok(self.raw().as_deref().and_then(SessionMarker::parse))
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        if self.fail {
            return Err(StoreError("marker clear failed".to_string()));
        }
        Ok(self.content.lock().expect("marker mutex poisoned").take().is_some())
    }
}
