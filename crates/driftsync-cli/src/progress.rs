//! Progress reporting for the scan and apply phases

use driftsync_types::{ExecutionObserver, ScanObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Spinner shown while the trees are being indexed
pub struct ScanSpinner {
    bar: Option<ProgressBar>,
}

impl ScanSpinner {
    /// Start the spinner, unless quiet mode suppresses it
    pub fn start(quiet: bool) -> Self {
        let bar = if quiet {
            None
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message("Indexing trees...");
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        };
        Self { bar }
    }

    /// Observer wired into the scanner, when the spinner is visible
    pub fn observer(&self) -> Option<Arc<dyn ScanObserver>> {
        self.bar
            .clone()
            .map(|bar| Arc::new(SpinnerObserver { bar }) as Arc<dyn ScanObserver>)
    }

    /// Replace the spinner message
    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Remove the spinner from the terminal
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

struct SpinnerObserver {
    bar: ProgressBar,
}

impl ScanObserver for SpinnerObserver {
    fn files_indexed(&self, total: u64) {
        self.bar.set_message(format!("Indexed {} files", total));
    }
}

/// Bar tracking journaled actions during apply
pub struct ApplyBar {
    bar: Option<ProgressBar>,
}

impl ApplyBar {
    /// Start the bar for `total` planned actions
    pub fn start(total: u64, quiet: bool) -> Self {
        let bar = if quiet {
            None
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {msg} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
                    .unwrap()
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            pb.set_message("Applying updates");
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        };
        Self { bar }
    }

    /// Observer wired into the executor, when the bar is visible
    pub fn observer(&self) -> Option<Arc<dyn ExecutionObserver>> {
        self.bar
            .clone()
            .map(|bar| Arc::new(BarObserver { bar }) as Arc<dyn ExecutionObserver>)
    }

    /// Remove the bar from the terminal
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

struct BarObserver {
    bar: ProgressBar,
}

impl ExecutionObserver for BarObserver {
    fn action_finished(&self, completed: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(completed);
    }
}
