//! Duplicate and relocation resolution
//!
//! Deep scan refines the metadata-derived categories by content. Every
//! new source file is fingerprinted and matched against destination
//! files of the same size. A match against a missing destination file
//! means the content moved, and the pair leaves both lists as one
//! relocation. A match against any other destination file is reported
//! as a duplicate. Files whose fingerprint cannot be computed keep
//! their metadata-derived category.

use crate::report::{ComparisonReport, DuplicateMatch, RelocatedPair};
use driftsync_scan::{Fingerprinter, TreeIndex};
use driftsync_types::FileRecord;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info};

/// Resolves duplicate and relocated content within a report
pub struct DuplicateResolver<'a> {
    fingerprinter: &'a Fingerprinter,
}

impl<'a> DuplicateResolver<'a> {
    /// Create a resolver backed by the given fingerprinter
    pub fn new(fingerprinter: &'a Fingerprinter) -> Self {
        Self { fingerprinter }
    }

    /// Refine the new files of `report` against destination content
    ///
    /// Only destination files sized like some new file are hashed;
    /// content-equal files are size-equal, so everything else can be
    /// skipped without missing a match. When several destination paths
    /// hold the same content, the lexically first one wins.
    pub async fn resolve(&self, report: &mut ComparisonReport, destination: &TreeIndex) {
        report.deep_scan = true;
        if report.new.is_empty() {
            return;
        }

        let new_sizes: HashSet<u64> = report.new.iter().map(|record| record.size).collect();
        let candidates: Vec<&FileRecord> = destination
            .records()
            .filter(|record| new_sizes.contains(&record.size))
            .collect();

        let mut to_hash: Vec<PathBuf> = report
            .new
            .iter()
            .map(|record| record.absolute.clone())
            .collect();
        to_hash.extend(candidates.iter().map(|record| record.absolute.clone()));
        debug!(
            "Deep scan fingerprinting {} new and {} candidate destination files",
            report.new.len(),
            candidates.len()
        );
        let digests = self.fingerprinter.fingerprint_all(to_hash).await;

        // Holder sets stay sorted so ties resolve to the lexically
        // first destination path.
        let mut dest_by_fp: HashMap<&str, BTreeSet<String>> = HashMap::new();
        let mut missing_by_fp: HashMap<&str, BTreeSet<String>> = HashMap::new();
        {
            let missing_relatives: HashSet<&str> = report
                .missing
                .iter()
                .map(|record| record.relative.as_str())
                .collect();
            for record in &candidates {
                if let Some(fp) = digests.get(&record.absolute) {
                    dest_by_fp
                        .entry(fp.as_str())
                        .or_default()
                        .insert(record.relative.clone());
                    if missing_relatives.contains(record.relative.as_str()) {
                        missing_by_fp
                            .entry(fp.as_str())
                            .or_default()
                            .insert(record.relative.clone());
                    }
                }
            }
        }

        let original_new = std::mem::take(&mut report.new);
        let mut surviving = Vec::new();
        let mut consumed_missing: HashSet<String> = HashSet::new();

        for record in original_new {
            let Some(fp) = digests.get(&record.absolute) else {
                surviving.push(record);
                continue;
            };

            // A missing holder takes precedence: the pair is one move.
            if let Some(holders) = missing_by_fp.get_mut(fp.as_str()) {
                if let Some(old_relative) = holders.pop_first() {
                    debug!("Relocated: '{}' was '{}'", record.relative, old_relative);
                    consumed_missing.insert(old_relative.clone());
                    report.relocated.push(RelocatedPair {
                        record: record.with_fingerprint(fp.clone()),
                        old_relative,
                        fingerprint: fp.clone(),
                    });
                    continue;
                }
            }

            if let Some(existing_relative) = dest_by_fp
                .get(fp.as_str())
                .and_then(|holders| holders.iter().next())
            {
                debug!(
                    "Duplicate: '{}' matches '{}'",
                    record.relative, existing_relative
                );
                report.duplicates.push(DuplicateMatch {
                    record: record.with_fingerprint(fp.clone()),
                    existing_relative: existing_relative.clone(),
                    fingerprint: fp.clone(),
                });
                continue;
            }

            surviving.push(record.with_fingerprint(fp.clone()));
        }

        report.new = surviving;
        report
            .missing
            .retain(|record| !consumed_missing.contains(&record.relative));
        for record in &mut report.missing {
            if record.fingerprint.is_none() {
                if let Some(fp) = digests.get(&record.absolute) {
                    record.fingerprint = Some(fp.clone());
                }
            }
        }

        info!(
            "Deep scan resolved {} relocated and {} duplicate files",
            report.relocated.len(),
            report.duplicates.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::SystemTime;
    use tempfile::TempDir;
    use tokio::fs;

    async fn write_record(dir: &Path, relative: &str, content: &[u8]) -> FileRecord {
        let absolute = dir.join(relative);
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).await.unwrap();
        }
        fs::write(&absolute, content).await.unwrap();
        FileRecord::new(relative, absolute, content.len() as u64, SystemTime::now())
    }

    fn index_of(root: &Path, records: Vec<FileRecord>) -> TreeIndex {
        let mut index = TreeIndex::new(root);
        for record in records {
            index.insert(record);
        }
        index
    }

    #[tokio::test]
    async fn test_moved_file_becomes_relocated() {
        let dest_dir = TempDir::new().unwrap();
        let src_dir = TempDir::new().unwrap();

        let new_rec = write_record(src_dir.path(), "new/x.bin", b"moved content").await;
        let old_rec = write_record(dest_dir.path(), "old/x.bin", b"moved content").await;

        let destination = index_of(dest_dir.path(), vec![old_rec.clone()]);
        let mut report = ComparisonReport::new(src_dir.path(), dest_dir.path());
        report.new.push(new_rec);
        report.missing.push(old_rec);

        let fingerprinter = Fingerprinter::new(2);
        DuplicateResolver::new(&fingerprinter)
            .resolve(&mut report, &destination)
            .await;

        assert!(report.new.is_empty());
        assert!(report.missing.is_empty());
        assert_eq!(report.relocated.len(), 1);
        assert_eq!(report.relocated[0].record.relative, "new/x.bin");
        assert_eq!(report.relocated[0].old_relative, "old/x.bin");
        assert!(report.deep_scan);
    }

    #[tokio::test]
    async fn test_duplicate_of_synced_file() {
        let dest_dir = TempDir::new().unwrap();
        let src_dir = TempDir::new().unwrap();

        let new_rec = write_record(src_dir.path(), "copies/again.bin", b"shared bytes").await;
        // kept.bin also exists in the source, so it is not missing.
        let kept_rec = write_record(dest_dir.path(), "kept.bin", b"shared bytes").await;

        let destination = index_of(dest_dir.path(), vec![kept_rec]);
        let mut report = ComparisonReport::new(src_dir.path(), dest_dir.path());
        report.new.push(new_rec);

        let fingerprinter = Fingerprinter::new(2);
        DuplicateResolver::new(&fingerprinter)
            .resolve(&mut report, &destination)
            .await;

        assert!(report.new.is_empty());
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].existing_relative, "kept.bin");
    }

    #[tokio::test]
    async fn test_tie_breaks_to_lexically_first_holder() {
        let dest_dir = TempDir::new().unwrap();
        let src_dir = TempDir::new().unwrap();

        let new_rec = write_record(src_dir.path(), "n.bin", b"twice in dest").await;
        let holder_b = write_record(dest_dir.path(), "b-holder.bin", b"twice in dest").await;
        let holder_a = write_record(dest_dir.path(), "a-holder.bin", b"twice in dest").await;

        let destination = index_of(dest_dir.path(), vec![holder_b.clone(), holder_a.clone()]);
        let mut report = ComparisonReport::new(src_dir.path(), dest_dir.path());
        report.new.push(new_rec);
        report.missing.push(holder_b);
        report.missing.push(holder_a);

        let fingerprinter = Fingerprinter::new(2);
        DuplicateResolver::new(&fingerprinter)
            .resolve(&mut report, &destination)
            .await;

        assert_eq!(report.relocated.len(), 1);
        assert_eq!(report.relocated[0].old_relative, "a-holder.bin");
        // The other holder is still missing, now with its fingerprint.
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].relative, "b-holder.bin");
        assert!(report.missing[0].fingerprint.is_some());
    }

    #[tokio::test]
    async fn test_second_copy_becomes_duplicate_after_relocation() {
        let dest_dir = TempDir::new().unwrap();
        let src_dir = TempDir::new().unwrap();

        let first = write_record(src_dir.path(), "a-first.bin", b"same everywhere").await;
        let second = write_record(src_dir.path(), "b-second.bin", b"same everywhere").await;
        let holder = write_record(dest_dir.path(), "stash.bin", b"same everywhere").await;

        let destination = index_of(dest_dir.path(), vec![holder.clone()]);
        let mut report = ComparisonReport::new(src_dir.path(), dest_dir.path());
        report.new.push(first);
        report.new.push(second);
        report.missing.push(holder);

        let fingerprinter = Fingerprinter::new(2);
        DuplicateResolver::new(&fingerprinter)
            .resolve(&mut report, &destination)
            .await;

        // One move explains the missing file; the second copy is a
        // duplicate of the same destination content.
        assert_eq!(report.relocated.len(), 1);
        assert_eq!(report.relocated[0].record.relative, "a-first.bin");
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].record.relative, "b-second.bin");
        assert_eq!(report.duplicates[0].existing_relative, "stash.bin");
        assert!(report.missing.is_empty());
    }

    #[tokio::test]
    async fn test_unhashable_file_stays_new() {
        let dest_dir = TempDir::new().unwrap();
        let src_dir = TempDir::new().unwrap();

        let ghost = FileRecord::new(
            "ghost.bin",
            src_dir.path().join("never-written.bin"),
            13,
            SystemTime::now(),
        );
        let holder = write_record(dest_dir.path(), "holder.bin", b"thirteen byte").await;

        let destination = index_of(dest_dir.path(), vec![holder.clone()]);
        let mut report = ComparisonReport::new(src_dir.path(), dest_dir.path());
        report.new.push(ghost);
        report.missing.push(holder);

        let fingerprinter = Fingerprinter::new(2);
        DuplicateResolver::new(&fingerprinter)
            .resolve(&mut report, &destination)
            .await;

        assert_eq!(report.new.len(), 1);
        assert_eq!(report.new[0].relative, "ghost.bin");
        assert_eq!(report.missing.len(), 1);
        assert!(report.relocated.is_empty());
    }

    #[tokio::test]
    async fn test_size_prefilter_skips_unrelated_content() {
        let dest_dir = TempDir::new().unwrap();
        let src_dir = TempDir::new().unwrap();

        let new_rec = write_record(src_dir.path(), "fresh.bin", b"brand new data").await;
        let other = write_record(dest_dir.path(), "other.bin", b"different length here").await;

        let destination = index_of(dest_dir.path(), vec![other.clone()]);
        let mut report = ComparisonReport::new(src_dir.path(), dest_dir.path());
        report.new.push(new_rec);
        report.missing.push(other);

        let fingerprinter = Fingerprinter::new(2);
        DuplicateResolver::new(&fingerprinter)
            .resolve(&mut report, &destination)
            .await;

        assert_eq!(report.new.len(), 1);
        assert!(report.new[0].fingerprint.is_some());
        // The mismatched-size holder was never worth hashing.
        assert!(report.missing[0].fingerprint.is_none());
    }
}
