//! Append-only execution journal
//!
//! Every finished action becomes one JSON line. The journal is opened
//! in append mode and never rewritten, so successive runs against the
//! same output directory accumulate a full history, distinguishable by
//! run identifier.

use crate::plan::{Action, ActionKind, ActionReason};
use chrono::{DateTime, Utc};
use driftsync_types::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

/// File name used for journals written into an output directory
pub const JOURNAL_FILE_NAME: &str = "update-journal.jsonl";

/// Terminal outcome of one executed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionOutcome {
    /// Action completed without error
    Success,
    /// Action failed with the given reason; the run continued
    Failed(String),
}

impl ActionOutcome {
    /// Check whether this outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success)
    }
}

/// One journal line describing a finished action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Identifier of the run that produced this record
    pub run_id: Uuid,
    /// When the action finished
    pub timestamp: DateTime<Utc>,
    /// Destination-relative path
    pub relative: String,
    /// Operation that was performed
    pub kind: ActionKind,
    /// Report category that produced the action
    pub reason: ActionReason,
    /// Absolute source path
    pub source: PathBuf,
    /// Absolute destination path
    pub destination: PathBuf,
    /// Terminal outcome
    pub outcome: ActionOutcome,
    /// Context carried over from the plan plus runtime notes
    pub note: Option<String>,
}

impl ExecutionRecord {
    fn base(run_id: Uuid, action: &Action, outcome: ActionOutcome) -> Self {
        Self {
            run_id,
            timestamp: Utc::now(),
            relative: action.relative.clone(),
            kind: action.kind,
            reason: action.reason,
            source: action.source.clone(),
            destination: action.destination.clone(),
            outcome,
            note: action.note.clone(),
        }
    }

    /// Record a successful action
    pub fn success(run_id: Uuid, action: &Action) -> Self {
        Self::base(run_id, action, ActionOutcome::Success)
    }

    /// Record a failed action
    pub fn failure<S: Into<String>>(run_id: Uuid, action: &Action, reason: S) -> Self {
        Self::base(run_id, action, ActionOutcome::Failed(reason.into()))
    }

    /// Append a runtime note, keeping any note from the plan
    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        let note = note.into();
        self.note = Some(match self.note.take() {
            Some(existing) => format!("{existing}; {note}"),
            None => note,
        });
        self
    }
}

/// Append-only journal writer
#[derive(Debug)]
pub struct UpdateJournal {
    path: PathBuf,
    file: File,
}

impl UpdateJournal {
    /// Open a journal for appending, creating it as needed
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::persistence(format!(
                        "Failed to create journal directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                Error::persistence(format!("Failed to open journal '{}': {}", path.display(), e))
            })?;

        Ok(Self { path, file })
    }

    /// Open the standard journal inside an output directory
    pub async fn open_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open(dir.as_ref().join(JOURNAL_FILE_NAME)).await
    }

    /// Path the journal writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a JSON line
    pub async fn append(&mut self, record: &ExecutionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| Error::persistence(format!("Failed to serialize journal record: {}", e)))?;
        line.push('\n');

        self.file.write_all(line.as_bytes()).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to append to journal '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Flush buffered records to disk
    pub async fn flush(&mut self) -> Result<()> {
        self.file.flush().await.map_err(|e| {
            Error::persistence(format!(
                "Failed to flush journal '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Read every record from a journal file, oldest first
    pub async fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<ExecutionRecord>> {
        let path = path.as_ref();
        let file = File::open(path).await.map_err(|e| {
            Error::persistence(format!("Failed to read journal '{}': {}", path.display(), e))
        })?;

        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(|e| {
            Error::persistence(format!("Failed to read journal '{}': {}", path.display(), e))
        })? {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| {
                Error::persistence(format!(
                    "Corrupt journal line in '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }
}
