//! Directory tree scanner
//!
//! The scanner walks a root directory on the blocking thread pool and
//! produces a [`TreeIndex`]. Unreadable entries become warnings instead
//! of failing the whole scan; only a missing or unreadable root is a
//! hard error.

use crate::index::TreeIndex;
use driftsync_types::{Error, FileRecord, Result, ScanObserver, ScanWarning};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Options controlling how directory trees are walked
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Follow symbolic links while walking
    ///
    /// Link cycles are detected by the walker and surface as warnings.
    pub follow_symlinks: bool,
    /// Number of indexed files between observer notifications
    pub progress_every: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            progress_every: 1000,
        }
    }
}

/// Scanner that builds a [`TreeIndex`] from a directory root
pub struct TreeScanner {
    options: ScanOptions,
    observer: Option<Arc<dyn ScanObserver>>,
}

impl TreeScanner {
    /// Create a scanner with the given options
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            observer: None,
        }
    }

    /// Create a scanner with default options
    pub fn with_defaults() -> Self {
        Self::new(ScanOptions::default())
    }

    /// Attach an observer notified with running file counts
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Scan a directory tree and build its index
    ///
    /// The walk runs on the blocking thread pool. Directory entries that
    /// cannot be read are recorded as warnings on the returned index.
    pub async fn scan<P: AsRef<Path>>(&self, root: P) -> Result<TreeIndex> {
        let root = root.as_ref();

        let metadata = tokio::fs::metadata(root)
            .await
            .map_err(|_| Error::root_not_found(root))?;
        if !metadata.is_dir() {
            return Err(Error::scan(format!(
                "'{}' is not a directory",
                root.display()
            )));
        }

        let root = tokio::fs::canonicalize(root).await.map_err(|e| {
            Error::scan(format!(
                "Failed to resolve root '{}': {}",
                root.display(),
                e
            ))
        })?;

        let options = self.options.clone();
        let observer = self.observer.clone();
        let walk_root = root.clone();
        let index = tokio::task::spawn_blocking(move || walk_tree(walk_root, options, observer))
            .await
            .map_err(|e| Error::scan(format!("Scan task failed: {}", e)))?;

        info!(
            "Indexed {} files ({} bytes) under '{}', {} warnings",
            index.len(),
            index.total_size(),
            root.display(),
            index.warnings.len()
        );
        Ok(index)
    }

    /// Scan source and destination trees concurrently
    ///
    /// Fails before walking anything when the two roots resolve to the
    /// same directory.
    pub async fn scan_pair<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<(TreeIndex, TreeIndex)> {
        let source = source.as_ref();
        let destination = destination.as_ref();

        if let (Ok(src), Ok(dst)) = (
            tokio::fs::canonicalize(source).await,
            tokio::fs::canonicalize(destination).await,
        ) {
            if src == dst {
                return Err(Error::config(
                    "Source and destination are the same directory",
                ));
            }
        }

        tokio::try_join!(self.scan(source), self.scan(destination))
    }
}

/// Walk a tree synchronously, collecting file records and warnings
fn walk_tree(
    root: PathBuf,
    options: ScanOptions,
    observer: Option<Arc<dyn ScanObserver>>,
) -> TreeIndex {
    let mut index = TreeIndex::new(&root);
    let progress_every = options.progress_every.max(1);
    let mut indexed: u64 = 0;

    for entry in WalkDir::new(&root).follow_links(options.follow_symlinks) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let warning = match err.path() {
                    Some(path) => ScanWarning::at_path(path, err.to_string()),
                    None => ScanWarning::general(err.to_string()),
                };
                warn!("Scan warning: {}", warning);
                index.push_warning(warning);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                let warning = ScanWarning::at_path(entry.path(), err.to_string());
                warn!("Scan warning: {}", warning);
                index.push_warning(warning);
                continue;
            }
        };

        let Some(relative) = normalize_relative(&root, entry.path()) else {
            debug!("Skipping entry outside root: {}", entry.path().display());
            index.push_warning(ScanWarning::at_path(
                entry.path(),
                "path escapes the scanned root",
            ));
            continue;
        };

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        index.insert(FileRecord::new(
            relative,
            entry.path(),
            metadata.len(),
            modified,
        ));

        indexed += 1;
        if indexed % progress_every == 0 {
            if let Some(observer) = &observer {
                observer.files_indexed(indexed);
            }
        }
    }

    if let Some(observer) = &observer {
        observer.files_indexed(indexed);
    }
    index
}

/// Build the normalized relative path for an entry under `root`
///
/// Returns `None` for the root itself and for paths outside the root.
fn normalize_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
