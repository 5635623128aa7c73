//! Update planning
//!
//! The planner turns a comparison report into an ordered list of
//! actions. Planning is pure: it never touches the filesystem, and the
//! same report with the same options always yields the same plan.
//! Missing files produce no actions, as the engine never deletes.

use driftsync_diff::ComparisonReport;
use driftsync_types::{DuplicatePolicy, RelocatedPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// What the executor should do for one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Copy the source file to its destination path
    Copy,
    /// Copy relocated content to its new destination path, leaving the
    /// old copy in place
    CopyToAlternate,
    /// Record the file without touching the filesystem
    Skip,
    /// Defer to a confirmation callback at execution time
    Confirm,
}

/// Why a file is part of the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionReason {
    /// File is absent from the destination
    New,
    /// File differs between the trees
    Modified,
    /// Identical content exists elsewhere in the destination
    Duplicate,
    /// Content moved within the destination
    Relocated,
}

/// One planned operation against the destination tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Operation to perform
    pub kind: ActionKind,
    /// Absolute source path to read from
    pub source: PathBuf,
    /// Absolute destination path to write to
    pub destination: PathBuf,
    /// Destination-relative path, the plan's ordering key
    pub relative: String,
    /// Report category that produced this action
    pub reason: ActionReason,
    /// Optional context, e.g. where duplicate content already lives
    pub note: Option<String>,
}

/// Options controlling update planning
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Policy applied to duplicate files
    pub duplicate_policy: DuplicatePolicy,
    /// Policy applied to relocated files
    pub relocated_policy: RelocatedPolicy,
    /// Restrict modified files to this set of relative paths
    ///
    /// `None` plans every modified file. Entries outside the set become
    /// skip actions so the journal still accounts for them.
    pub modified_filter: Option<HashSet<String>>,
}

/// Ordered list of actions for one update run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlan {
    /// Root of the source tree
    pub source_root: PathBuf,
    /// Root of the destination tree
    pub destination_root: PathBuf,
    /// Actions sorted by destination-relative path
    pub actions: Vec<Action>,
}

impl UpdatePlan {
    /// Number of actions in the plan
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check whether the plan contains no actions
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of actions that will write to the destination
    pub fn copies(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| {
                matches!(action.kind, ActionKind::Copy | ActionKind::CopyToAlternate)
            })
            .count()
    }

    /// Number of skip actions
    pub fn skips(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| action.kind == ActionKind::Skip)
            .count()
    }

    /// Number of actions awaiting confirmation
    pub fn confirms(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| action.kind == ActionKind::Confirm)
            .count()
    }
}

/// Builds update plans from comparison reports
#[derive(Debug, Clone)]
pub struct UpdatePlanner {
    options: PlanOptions,
}

impl UpdatePlanner {
    /// Create a planner with the given options
    pub fn new(options: PlanOptions) -> Self {
        Self { options }
    }

    /// Create a planner with default options
    pub fn with_defaults() -> Self {
        Self::new(PlanOptions::default())
    }

    /// Build the action list for a report
    pub fn plan(&self, report: &ComparisonReport) -> UpdatePlan {
        let dest_root = &report.destination_root;
        let mut actions = Vec::new();

        for record in &report.new {
            actions.push(Action {
                kind: ActionKind::Copy,
                source: record.absolute.clone(),
                destination: join_relative(dest_root, &record.relative),
                relative: record.relative.clone(),
                reason: ActionReason::New,
                note: None,
            });
        }

        for pair in &report.modified {
            let relative = &pair.source.relative;
            let selected = self
                .options
                .modified_filter
                .as_ref()
                .map_or(true, |filter| filter.contains(relative));
            let (kind, note) = if selected {
                let note = if pair.source_newer {
                    None
                } else {
                    Some("destination copy is not older".to_string())
                };
                (ActionKind::Copy, note)
            } else {
                (ActionKind::Skip, Some("excluded by selection".to_string()))
            };
            actions.push(Action {
                kind,
                source: pair.source.absolute.clone(),
                destination: join_relative(dest_root, relative),
                relative: relative.clone(),
                reason: ActionReason::Modified,
                note,
            });
        }

        for duplicate in &report.duplicates {
            let kind = match self.options.duplicate_policy {
                DuplicatePolicy::CopyAnyway => ActionKind::Copy,
                DuplicatePolicy::Skip => ActionKind::Skip,
                DuplicatePolicy::AskEachTime => ActionKind::Confirm,
            };
            actions.push(Action {
                kind,
                source: duplicate.record.absolute.clone(),
                destination: join_relative(dest_root, &duplicate.record.relative),
                relative: duplicate.record.relative.clone(),
                reason: ActionReason::Duplicate,
                note: Some(format!(
                    "duplicate content at '{}'",
                    duplicate.existing_relative
                )),
            });
        }

        for relocated in &report.relocated {
            let kind = match self.options.relocated_policy {
                RelocatedPolicy::Skip => ActionKind::Skip,
                RelocatedPolicy::CopyToAlternate => ActionKind::CopyToAlternate,
            };
            actions.push(Action {
                kind,
                source: relocated.record.absolute.clone(),
                destination: join_relative(dest_root, &relocated.record.relative),
                relative: relocated.record.relative.clone(),
                reason: ActionReason::Relocated,
                note: Some(format!("content already at '{}'", relocated.old_relative)),
            });
        }

        // Report categories are disjoint by relative path, so this sort
        // key is unique and the order total.
        actions.sort_by(|a, b| a.relative.cmp(&b.relative));

        let plan = UpdatePlan {
            source_root: report.source_root.clone(),
            destination_root: report.destination_root.clone(),
            actions,
        };
        info!(
            "Planned {} actions: {} copies, {} skips, {} confirmations",
            plan.len(),
            plan.copies(),
            plan.skips(),
            plan.confirms()
        );
        plan
    }
}

/// Join a normalized relative path onto a root directory
fn join_relative(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in relative.split('/') {
        path.push(part);
    }
    path
}
