//! Persistent list of failed write-backs.
//!
//! Nothing here retries on its own. Entries sit in the outbox until the user
//! asks for a retry, at which point the caller takes them all and re-queues
//! whatever fails again.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::data_dir;
use crate::sync::types::{SyncError, SyncOperation};

const OUTBOX_FILE: &str = "outbox.json";

/// A write-back that failed and is waiting for a manual retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: String,
    pub operation: SyncOperation,
    pub failed_at: DateTime<Utc>,
    /// Attempts made so far, including the first one.
    pub attempts: u32,
    pub last_error: String,
}

#[derive(Debug, Default)]
pub struct Outbox {
    entries: Vec<OutboxEntry>,
    /// `None` keeps the outbox in memory only.
    file: Option<PathBuf>,
}

impl Outbox {
    /// Outbox in the data directory, loading whatever a previous run left.
    pub fn open() -> Result<Self, SyncError> {
        let dir = data_dir().map_err(|e| SyncError::Unavailable(e.to_string()))?;
        Self::open_at(dir.join(OUTBOX_FILE))
    }

    /// Outbox at a specific path (for testing).
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let file = path.into();
        let entries = if file.exists() {
            let content = std::fs::read_to_string(&file)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        Ok(Self {
            entries,
            file: Some(file),
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Record a failed operation.
    pub fn push(&mut self, operation: SyncOperation, error: &SyncError) {
        self.entries.push(OutboxEntry {
            id: uuid::Uuid::new_v4().to_string(),
            operation,
            failed_at: Utc::now(),
            attempts: 1,
            last_error: error.to_string(),
        });
    }

    /// Re-queue an entry that failed again.
    pub fn requeue(&mut self, mut entry: OutboxEntry, error: &SyncError) {
        entry.attempts += 1;
        entry.failed_at = Utc::now();
        entry.last_error = error.to_string();
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[OutboxEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry, oldest first.
    pub fn take_all(&mut self) -> Vec<OutboxEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Write the outbox to disk. In-memory outboxes do nothing.
    pub fn persist(&self) -> Result<(), SyncError> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let data = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(file, data)?;
        Ok(())
    }
}
