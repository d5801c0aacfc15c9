use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::services::AuditLog;

/// Single, never-rotated report log file.
pub struct FileAuditLog {
    writer: Mutex<RollingFileAppender>,
}

impl FileAuditLog {
    pub fn open(dir: impl AsRef<Path>, file_name: &str) -> Result<Self> {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(dir.as_ref())
            .with_context(|| format!("failed to open audit log {}", dir.as_ref().join(file_name).display()))?;

        Ok(Self {
            writer: Mutex::new(appender),
        })
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, line: &str) {
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            warn!(error = %e, "Failed to write audit line");
        }
    }
}
