use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::ports::DiagnosticLog;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Plain text history next to the marker, one block per run.
pub struct FileDiagnosticLog {
    path: PathBuf,
}

impl FileDiagnosticLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn append(&self, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())
    }

    fn append_or_warn(&self, text: &str) {
        if let Err(e) = self.append(text) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to write diagnostic log"
            );
        }
    }
}

impl DiagnosticLog for FileDiagnosticLog {
    fn begin_run(&self) {
        self.append_or_warn(&format!("\n{}\n", "=".repeat(60)));
    }

    fn record(&self, line: &str) {
        let stamp = Local::now().format(TIMESTAMP_FORMAT);
        self.append_or_warn(&format!("[{stamp}] {line}\n"));
    }
}
