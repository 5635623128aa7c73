//! Update planning and execution for driftsync
//!
//! This crate turns a comparison report into an explicit update plan and
//! applies that plan to the destination tree, journaling every action.
//!
//! # Features
//!
//! - **Policy-driven planning**: Duplicate and relocated findings become
//!   actions through configurable policies
//! - **Deterministic plans**: Actions are ordered lexically and planning
//!   never touches the filesystem
//! - **Isolated failures**: A failed copy is journaled and the run continues
//! - **Append-only journal**: Every finished action lands in a JSONL journal
//! - **Cancellation**: Runs stop between actions, never mid-copy
//!
//! # Examples
//!
//! ```rust
//! use driftsync_diff::ReportStore;
//! use driftsync_engine::{ExecOptions, PlanOptions, UpdateExecutor, UpdateJournal, UpdatePlanner};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let report = ReportStore::load(Path::new("out/scan-report.json")).await?;
//! let plan = UpdatePlanner::new(PlanOptions::default()).plan(&report);
//! let mut journal = UpdateJournal::open_in(Path::new("out")).await?;
//! let summary = UpdateExecutor::new(ExecOptions::default())
//!     .execute(&plan, &mut journal)
//!     .await?;
//! println!("Applied: {}", summary);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cancel;
pub mod executor;
pub mod journal;
pub mod plan;

pub use cancel::CancellationToken;
pub use executor::{DecisionFn, ExecOptions, ExecutionSummary, UpdateExecutor};
pub use journal::{ActionOutcome, ExecutionRecord, UpdateJournal, JOURNAL_FILE_NAME};
pub use plan::{Action, ActionKind, ActionReason, PlanOptions, UpdatePlan, UpdatePlanner};
