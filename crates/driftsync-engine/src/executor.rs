//! Update execution
//!
//! The executor walks a finished plan and applies it to the live
//! filesystem. Failures are isolated per action: a copy that fails is
//! journaled as failed and the run continues. Journal order always
//! matches plan order, even when copies run concurrently.

use crate::cancel::CancellationToken;
use crate::journal::{ExecutionRecord, UpdateJournal};
use crate::plan::{Action, ActionKind, UpdatePlan};
use driftsync_types::{Cancellable, Error, ExecutionObserver, Result};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Decision callback consulted for confirm actions
pub type DecisionFn = Arc<dyn Fn(&Action) -> bool + Send + Sync>;

/// Options controlling update execution
#[derive(Clone)]
pub struct ExecOptions {
    /// Concurrent copy operations (0 or 1 = sequential)
    pub jobs: usize,
    /// Preserve source modification times on copied files
    pub preserve_mtime: bool,
    /// Decision callback for confirm actions
    ///
    /// Without a callback, confirm actions are journaled as skipped
    /// with an unresolved-confirmation note.
    pub decide: Option<DecisionFn>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            jobs: 0,
            preserve_mtime: true,
            decide: None,
        }
    }
}

impl fmt::Debug for ExecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecOptions")
            .field("jobs", &self.jobs)
            .field("preserve_mtime", &self.preserve_mtime)
            .field("decide", &self.decide.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// Summary of one update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Identifier shared by all journal records of this run
    pub run_id: Uuid,
    /// Number of files copied
    pub copied: usize,
    /// Number of actions skipped
    pub skipped: usize,
    /// Number of actions that failed
    pub failed: usize,
    /// Whether the run was cancelled before completing
    pub cancelled: bool,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl ExecutionSummary {
    /// Total number of journaled actions
    pub fn total(&self) -> usize {
        self.copied + self.skipped + self.failed
    }
}

impl fmt::Display for ExecutionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} copied, {} skipped, {} failed in {:.2?}",
            self.copied, self.skipped, self.failed, self.elapsed
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Executes update plans against the live filesystem
pub struct UpdateExecutor {
    options: ExecOptions,
    token: Option<CancellationToken>,
    observer: Option<Arc<dyn ExecutionObserver>>,
}

impl UpdateExecutor {
    /// Create an executor with the given options
    pub fn new(options: ExecOptions) -> Self {
        Self {
            options,
            token: None,
            observer: None,
        }
    }

    /// Create an executor with default options
    pub fn with_defaults() -> Self {
        Self::new(ExecOptions::default())
    }

    /// Attach a cancellation token checked between actions
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Attach an observer notified after each journaled action
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Execute a plan, journaling every finished action
    ///
    /// Actions run through an ordered buffered stream, so the journal
    /// records appear in plan order regardless of `jobs`. The planner
    /// guarantees distinct destination paths, which keeps concurrent
    /// copies from ever sharing a target.
    pub async fn execute(
        &self,
        plan: &UpdatePlan,
        journal: &mut UpdateJournal,
    ) -> Result<ExecutionSummary> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let jobs = self.options.jobs.max(1);
        let total = plan.len() as u64;
        info!(
            "Executing {} actions with {} worker(s), run {}",
            total, jobs, run_id
        );

        let mut summary = ExecutionSummary {
            run_id,
            copied: 0,
            skipped: 0,
            failed: 0,
            cancelled: false,
            elapsed: Duration::ZERO,
        };

        let mut results = stream::iter(
            plan.actions
                .iter()
                .map(|action| self.perform(run_id, action)),
        )
        .buffered(jobs);

        let mut completed: u64 = 0;
        while let Some(outcome) = results.next().await {
            let Some(record) = outcome else {
                continue;
            };
            if !record.outcome.is_success() {
                summary.failed += 1;
            } else if record.kind == ActionKind::Skip {
                summary.skipped += 1;
            } else {
                summary.copied += 1;
            }
            journal.append(&record).await?;
            completed += 1;
            if let Some(observer) = &self.observer {
                observer.action_finished(completed, total);
            }
        }
        journal.flush().await?;

        summary.cancelled = self.is_cancelled();
        summary.elapsed = started.elapsed();
        info!("Update finished: {}", summary);
        Ok(summary)
    }

    /// Perform one action, or return `None` when cancellation arrived
    /// before the action started
    async fn perform(&self, run_id: Uuid, action: &Action) -> Option<ExecutionRecord> {
        if self.is_cancelled() {
            debug!("Cancelled before '{}'", action.relative);
            return None;
        }

        let record = match action.kind {
            ActionKind::Skip => ExecutionRecord::success(run_id, action),
            ActionKind::Copy | ActionKind::CopyToAlternate => {
                self.copy_action(run_id, action).await
            }
            ActionKind::Confirm => self.confirm_action(run_id, action).await,
        };
        Some(record)
    }

    async fn copy_action(&self, run_id: Uuid, action: &Action) -> ExecutionRecord {
        match copy_file(
            &action.source,
            &action.destination,
            self.options.preserve_mtime,
        )
        .await
        {
            Ok(()) => {
                debug!("Copied '{}'", action.relative);
                ExecutionRecord::success(run_id, action)
            }
            Err(err) => {
                warn!("Copy failed for '{}': {}", action.relative, err);
                ExecutionRecord::failure(run_id, action, err.to_string())
            }
        }
    }

    /// Resolve a confirm action through the decision callback
    ///
    /// The journal records what actually happened: an approved action
    /// becomes a copy record, everything else a skip record.
    async fn confirm_action(&self, run_id: Uuid, action: &Action) -> ExecutionRecord {
        let Some(decide) = &self.options.decide else {
            let skipped = as_skip(action);
            return ExecutionRecord::success(run_id, &skipped)
                .with_note("unresolved confirmation");
        };

        if decide(action) {
            let approved = Action {
                kind: ActionKind::Copy,
                ..action.clone()
            };
            self.copy_action(run_id, &approved).await.with_note("confirmed")
        } else {
            let skipped = as_skip(action);
            ExecutionRecord::success(run_id, &skipped).with_note("declined")
        }
    }

    fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(|token| token.is_cancelled())
    }
}

fn as_skip(action: &Action) -> Action {
    Action {
        kind: ActionKind::Skip,
        ..action.clone()
    }
}

/// Copy one file, creating parent directories and optionally carrying
/// the source modification time over
async fn copy_file(source: &Path, destination: &Path, preserve_mtime: bool) -> Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::io(format!(
                "Failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    tokio::fs::copy(source, destination).await.map_err(|e| {
        Error::io(format!(
            "Failed to copy '{}' to '{}': {}",
            source.display(),
            destination.display(),
            e
        ))
    })?;

    if preserve_mtime {
        let metadata = tokio::fs::metadata(source).await.map_err(|e| {
            Error::io(format!(
                "Failed to read metadata of '{}': {}",
                source.display(),
                e
            ))
        })?;
        let modified = metadata.modified().map_err(|e| {
            Error::io(format!(
                "Modification time unavailable for '{}': {}",
                source.display(),
                e
            ))
        })?;

        let destination = destination.to_path_buf();
        tokio::task::spawn_blocking(move || {
            filetime::set_file_mtime(&destination, filetime::FileTime::from_system_time(modified))
                .map_err(|e| {
                    Error::io(format!(
                        "Failed to set mtime on '{}': {}",
                        destination.display(),
                        e
                    ))
                })
        })
        .await
        .map_err(|e| Error::io(format!("Timestamp task failed: {}", e)))??;
    }

    Ok(())
}
