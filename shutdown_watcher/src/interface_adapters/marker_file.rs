use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::ports::MarkerReader;
use crate::domain::session::ActiveSession;

pub struct FileMarkerReader {
    path: PathBuf,
}

impl FileMarkerReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MarkerReader for FileMarkerReader {
    fn load(&self) -> io::Result<Option<ActiveSession>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(ActiveSession::from_marker(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
