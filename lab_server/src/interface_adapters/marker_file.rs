use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::domain::entities::SessionMarker;
use crate::domain::errors::StoreError;
use crate::domain::ports::MarkerStore;

// Session marker kept in a small text file next to the server.
#[derive(Clone, Debug)]
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError(err.to_string())
    }
}

#[async_trait]
impl MarkerStore for FileMarkerStore {
    async fn write(&self, content: String) -> Result<(), StoreError> {
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn read(&self) -> Result<Option<SessionMarker>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(SessionMarker::parse(&content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn clear(&self) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
