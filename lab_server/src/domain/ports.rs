use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::domain::entities::{SessionMarker, SessionRecord};
use crate::domain::errors::StoreError;

// Port for the durable check-in/check-out table.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError>;
    // Check and insert happen atomically; false when the identity already has
    // an active record.
    async fn insert_unless_active(&self, record: SessionRecord) -> Result<bool, StoreError>;
    async fn find_active_by_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, StoreError>;
    // Closes an active record; false when it was not active (or missing).
    async fn complete(
        &self,
        session_id: &str,
        checked_out_at: NaiveDateTime,
    ) -> Result<bool, StoreError>;
    // All records, newest first.
    async fn list(&self) -> Result<Vec<SessionRecord>, StoreError>;
}

// Port for the single-slot session marker on this workstation.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    async fn write(&self, content: String) -> Result<(), StoreError>;
    async fn read(&self) -> Result<Option<SessionMarker>, StoreError>;
    // Returns whether a marker existed.
    async fn clear(&self) -> Result<bool, StoreError>;
}

// Port for retrieving the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn insert(&self, record: SessionRecord) -> Result<(), StoreError> {
        (**self).insert(record).await
    }

    async fn find_active_by_id(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        (**self).find_active_by_id(session_id).await
    }

    async fn insert_unless_active(&self, record: SessionRecord) -> Result<bool, StoreError> {
        (**self).insert_unless_active(record).await
    }

    async fn complete(
        &self,
        session_id: &str,
        checked_out_at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        (**self).complete(session_id, checked_out_at).await
    }

    async fn list(&self) -> Result<Vec<SessionRecord>, StoreError> {
        (**self).list().await
    }
}

#[async_trait]
impl<T: MarkerStore + ?Sized> MarkerStore for Arc<T> {
    async fn write(&self, content: String) -> Result<(), StoreError> {
        (**self).write(content).await
    }

    async fn read(&self) -> Result<Option<SessionMarker>, StoreError> {
        (**self).read().await
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        (**self).clear().await
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
