//! JSON-lines attempt log.
//!
//! Each finished attempt becomes one line: the [`AttemptRecord`] fields plus
//! an attempt id and the wall-clock time it was recorded.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use cfast_core::attempt::{AttemptRecord, AttemptSink, SinkError};

/// One line of the attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAttempt {
    pub attempt_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: AttemptRecord,
}

/// Appends attempts to a `.jsonl` file, creating it and its parent
/// directories on first write.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    last_id: Option<Uuid>,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_id: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id of the most recently stored attempt.
    pub fn last_id(&self) -> Option<Uuid> {
        self.last_id
    }

    fn append(&mut self, stored: &StoredAttempt) -> Result<(), SinkError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let mut line = serde_json::to_vec(stored)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }
}

impl AttemptSink for JsonlSink {
    fn store(&mut self, record: &AttemptRecord) -> Result<(), SinkError> {
        let stored = StoredAttempt {
            attempt_id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            record: record.clone(),
        };
        self.append(&stored)?;
        debug!(
            attempt_id = %stored.attempt_id,
            path = %self.path.display(),
            "attempt stored"
        );
        self.last_id = Some(stored.attempt_id);
        Ok(())
    }
}

/// Read every attempt in a log, oldest first. Blank lines are skipped.
pub fn read_attempts(path: &Path) -> Result<Vec<StoredAttempt>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open attempt log {}", path.display()))?;

    let mut attempts = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let stored: StoredAttempt = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed attempt record", path.display(), i + 1))?;
        attempts.push(stored);
    }
    Ok(attempts)
}
