//! In-memory index of one scanned directory tree

use driftsync_types::{FileRecord, ScanWarning};
use std::collections::HashMap;
use std::path::PathBuf;

/// Snapshot of every regular file found under a root directory
///
/// Files are keyed by their normalized relative path, so two indexes
/// built from different roots can be compared entry by entry.
#[derive(Debug, Clone)]
pub struct TreeIndex {
    /// Root directory this index was built from
    pub root: PathBuf,
    /// File records keyed by normalized relative path
    pub files: HashMap<String, FileRecord>,
    /// Non-fatal problems encountered during the scan
    pub warnings: Vec<ScanWarning>,
}

impl TreeIndex {
    /// Create an empty index for a root directory
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            files: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Insert a record, replacing any previous record for the same
    /// relative path
    pub fn insert(&mut self, record: FileRecord) {
        self.files.insert(record.relative.clone(), record);
    }

    /// Look up a record by its normalized relative path
    pub fn get(&self, relative: &str) -> Option<&FileRecord> {
        self.files.get(relative)
    }

    /// Check whether a relative path is present in the index
    pub fn contains(&self, relative: &str) -> bool {
        self.files.contains_key(relative)
    }

    /// Number of files in the index
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size in bytes of all indexed files
    pub fn total_size(&self) -> u64 {
        self.files.values().map(|record| record.size).sum()
    }

    /// Record a non-fatal scan problem
    pub fn push_warning(&mut self, warning: ScanWarning) {
        self.warnings.push(warning);
    }

    /// Relative paths in lexicographic order
    ///
    /// Comparison and planning walk indexes in this order so that two
    /// runs over the same trees always produce identical output.
    pub fn sorted_relatives(&self) -> Vec<&str> {
        let mut relatives: Vec<&str> = self.files.keys().map(String::as_str).collect();
        relatives.sort_unstable();
        relatives
    }

    /// Iterate over all records in unspecified order
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }
}
