//! Integration tests for driftsync
//!
//! These tests verify that scanning, diffing, planning and execution work
//! together correctly in real-world scenarios.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use tokio_test::assert_ok;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, UNIX_EPOCH};

use driftsync_config::{Config, ConfigLoader};
use driftsync_diff::{CompareEngine, CompareOptions, ComparisonReport, ReportStore};
use driftsync_engine::{
    ActionKind, ActionOutcome, PlanOptions, UpdateExecutor, UpdateJournal,
    UpdatePlanner,
};
use driftsync_scan::{TreeIndex, TreeScanner};
use driftsync_tests::test_utils::{generate_content, hours_ago, set_mtime, SyncFixture};
use driftsync_types::{DuplicatePolicy, FileRecord, RelocatedPolicy};

/// Scan both fixture trees and compare them
async fn compare_fixture(
    fixture: &SyncFixture,
    deep_scan: bool,
) -> Result<ComparisonReport, Box<dyn std::error::Error>> {
    let scanner = TreeScanner::with_defaults();
    let (source, destination) = scanner
        .scan_pair(fixture.source_path(), fixture.destination_path())
        .await?;

    let engine = CompareEngine::new(CompareOptions {
        deep_scan,
        ..CompareOptions::default()
    });
    Ok(engine.compare(&source, &destination).await)
}

/// Plan and execute a report against the fixture's destination tree
async fn apply_report(
    fixture: &SyncFixture,
    report: &ComparisonReport,
    options: PlanOptions,
) -> Result<driftsync_engine::ExecutionSummary, Box<dyn std::error::Error>> {
    let plan = UpdatePlanner::new(options).plan(report);
    let mut journal = UpdateJournal::open_in(fixture.output_path()).await?;
    let summary = UpdateExecutor::with_defaults()
        .execute(&plan, &mut journal)
        .await?;
    Ok(summary)
}

#[tokio::test]
async fn test_partition_invariant_on_real_trees() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    let shared_time = hours_ago(10);

    // unchanged pair
    let src_same = fixture.write_source("same.txt", b"identical");
    let dst_same = fixture.write_destination("same.txt", b"identical");
    set_mtime(&src_same, shared_time);
    set_mtime(&dst_same, shared_time);

    // modified by content age
    let src_upd = fixture.write_source("docs/updated.txt", b"version two");
    let dst_upd = fixture.write_destination("docs/updated.txt", b"version one");
    set_mtime(&src_upd, hours_ago(1));
    set_mtime(&dst_upd, hours_ago(20));

    // modified by size alone
    let src_grown = fixture.write_source("grown.bin", b"abcdef");
    let dst_grown = fixture.write_destination("grown.bin", b"abc");
    set_mtime(&src_grown, shared_time);
    set_mtime(&dst_grown, shared_time);

    fixture.write_source("brand/new.txt", b"fresh");
    fixture.write_destination("legacy/gone.txt", b"old");

    let report = compare_fixture(&fixture, false).await?;

    let mut seen: HashMap<String, u32> = HashMap::new();
    for record in &report.new {
        *seen.entry(record.relative.clone()).or_default() += 1;
    }
    for pair in &report.modified {
        *seen.entry(pair.source.relative.clone()).or_default() += 1;
    }
    for relative in &report.unchanged {
        *seen.entry(relative.clone()).or_default() += 1;
    }
    for record in &report.missing {
        *seen.entry(record.relative.clone()).or_default() += 1;
    }

    let all_paths = [
        "same.txt",
        "docs/updated.txt",
        "grown.bin",
        "brand/new.txt",
        "legacy/gone.txt",
    ];
    assert_eq!(seen.len(), all_paths.len());
    for path in all_paths {
        assert_eq!(seen.get(path), Some(&1), "{} classified once", path);
    }

    assert_eq!(report.unchanged, vec!["same.txt".to_string()]);
    assert_eq!(report.new.len(), 1);
    assert_eq!(report.modified.len(), 2);
    assert_eq!(report.missing.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_diff_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    fixture.write_source("a.txt", b"aaa");
    fixture.write_source("b/c.txt", b"ccc");
    fixture.write_destination("b/c.txt", b"older");
    fixture.write_destination("d.txt", b"ddd");

    let scanner = TreeScanner::with_defaults();
    let (source, destination) = scanner
        .scan_pair(fixture.source_path(), fixture.destination_path())
        .await?;

    let engine = CompareEngine::with_defaults();
    let first = engine.compare(&source, &destination).await;
    let second = engine.compare(&source, &destination).await;

    assert_eq!(first.new, second.new);
    assert_eq!(first.modified, second.modified);
    assert_eq!(first.unchanged, second.unchanged);
    assert_eq!(first.missing, second.missing);
    assert_eq!(first.relocated, second.relocated);
    assert_eq!(first.duplicates, second.duplicates);
    Ok(())
}

#[tokio::test]
async fn test_scenario_unchanged_and_new() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    let moment = hours_ago(6);

    let src_a = fixture.write_source("a.txt", b"0123456789");
    let dst_a = fixture.write_destination("a.txt", b"0123456789");
    set_mtime(&src_a, moment);
    set_mtime(&dst_a, moment);

    let src_b = fixture.write_source("b.txt", b"01234");
    set_mtime(&src_b, moment + Duration::from_secs(1));

    let report = compare_fixture(&fixture, false).await?;

    assert_eq!(report.unchanged, vec!["a.txt".to_string()]);
    assert_eq!(report.new.len(), 1);
    assert_eq!(report.new[0].relative, "b.txt");
    assert!(report.modified.is_empty());
    assert!(report.missing.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_deep_scan_relocation_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    let content = generate_content(4096, 42);
    fixture.write_destination("old/x.bin", &content);
    fixture.write_source("new/x.bin", &content);

    let report = compare_fixture(&fixture, true).await?;

    assert!(report.deep_scan);
    assert_eq!(report.relocated.len(), 1);
    assert_eq!(report.relocated[0].old_relative, "old/x.bin");
    assert_eq!(report.relocated[0].record.relative, "new/x.bin");
    assert!(report.new.is_empty(), "relocated file left the New set");
    assert!(report.missing.is_empty(), "relocated file left the Missing set");

    // Copy the content to its new location
    let summary = apply_report(
        &fixture,
        &report,
        PlanOptions {
            relocated_policy: RelocatedPolicy::CopyToAlternate,
            ..PlanOptions::default()
        },
    )
    .await?;

    assert_eq!(summary.copied, 1);
    assert_eq!(summary.failed, 0);
    let copied = fs::read(fixture.destination_path().join("new/x.bin"))?;
    assert_eq!(copied, content);
    assert!(fixture.destination_path().join("old/x.bin").exists());

    let journal_path = fixture.output_path().join(driftsync_engine::JOURNAL_FILE_NAME);
    let records = UpdateJournal::read_all(&journal_path).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ActionKind::CopyToAlternate);
    assert!(records[0].outcome.is_success());
    Ok(())
}

#[tokio::test]
async fn test_scenario_duplicate_policy_skip() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    let moment = hours_ago(3);
    let content = generate_content(2048, 7);

    // Same content kept in place on both sides, plus a second source copy
    // under a path the destination does not have.
    let src_keep = fixture.write_source("data/keep.bin", &content);
    let dst_keep = fixture.write_destination("data/keep.bin", &content);
    set_mtime(&src_keep, moment);
    set_mtime(&dst_keep, moment);
    fixture.write_source("incoming/copy.bin", &content);

    let report = compare_fixture(&fixture, true).await?;

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].record.relative, "incoming/copy.bin");
    assert_eq!(report.duplicates[0].existing_relative, "data/keep.bin");

    let plan = UpdatePlanner::new(PlanOptions {
        duplicate_policy: DuplicatePolicy::Skip,
        ..PlanOptions::default()
    })
    .plan(&report);

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.actions[0].kind, ActionKind::Skip);
    let note = plan.actions[0].note.as_deref().unwrap_or_default();
    assert!(note.contains("duplicate content"), "note was '{}'", note);

    let mut journal = UpdateJournal::open_in(fixture.output_path()).await?;
    let summary = UpdateExecutor::with_defaults()
        .execute(&plan, &mut journal)
        .await?;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.copied, 0);
    assert!(
        !fixture.destination_path().join("incoming/copy.bin").exists(),
        "skip action must not copy"
    );
    Ok(())
}

#[tokio::test]
async fn test_planner_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    fixture.write_source("z.txt", b"z");
    fixture.write_source("a/a.txt", b"a");
    fixture.write_source("m/m.txt", b"m");
    fixture.write_destination("m/m.txt", b"old");

    let report = compare_fixture(&fixture, false).await?;

    let planner = UpdatePlanner::new(PlanOptions::default());
    let first = planner.plan(&report);
    let second = planner.plan(&report);

    assert_eq!(first, second);
    let relatives: Vec<&str> = first.actions.iter().map(|a| a.relative.as_str()).collect();
    let mut sorted = relatives.clone();
    sorted.sort_unstable();
    assert_eq!(relatives, sorted, "actions ordered by relative path");
    Ok(())
}

#[tokio::test]
async fn test_executor_survives_permission_denial() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    fixture.write_source("blocked/inner.txt", b"cannot land");
    fixture.write_source("ok.txt", b"lands fine");
    fs::create_dir_all(fixture.destination_path().join("blocked"))?;

    let report = compare_fixture(&fixture, false).await?;
    assert_eq!(report.new.len(), 2);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let blocked_dir = fixture.destination_path().join("blocked");
        let mut perms = fs::metadata(&blocked_dir)?.permissions();
        perms.set_mode(0o555); // No write permission
        fs::set_permissions(&blocked_dir, perms)?;

        let summary = apply_report(&fixture, &report, PlanOptions::default()).await?;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.copied, 1);
        assert!(fixture.destination_path().join("ok.txt").exists());
        assert!(!fixture.destination_path().join("blocked/inner.txt").exists());

        let journal_path = fixture.output_path().join(driftsync_engine::JOURNAL_FILE_NAME);
        let records = UpdateJournal::read_all(&journal_path).await?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].relative, "blocked/inner.txt");
        assert!(matches!(records[0].outcome, ActionOutcome::Failed(_)));
        assert_eq!(records[1].relative, "ok.txt");
        assert!(records[1].outcome.is_success());

        // Restore permissions so the fixture can clean up
        let mut perms = fs::metadata(&blocked_dir)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&blocked_dir, perms)?;
    }

    Ok(())
}

#[tokio::test]
async fn test_report_round_trip_through_store() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    let moment = hours_ago(8);
    let shared = generate_content(1024, 3);

    let src_same = fixture.write_source("same.txt", b"stable");
    let dst_same = fixture.write_destination("same.txt", b"stable");
    set_mtime(&src_same, moment);
    set_mtime(&dst_same, moment);

    let src_keep = fixture.write_source("kept.bin", &shared);
    let dst_keep = fixture.write_destination("kept.bin", &shared);
    set_mtime(&src_keep, moment);
    set_mtime(&dst_keep, moment);

    fixture.write_source("upd.txt", b"new words");
    fixture.write_destination("upd.txt", b"old words!");
    fixture.write_source("fresh.txt", b"only in source");
    fixture.write_destination("legacy/stale.txt", b"only in destination");
    let moved = generate_content(512, 9);
    fixture.write_source("moved/here.bin", &moved);
    fixture.write_destination("was/there.bin", &moved);
    fixture.write_source("extra/dup.bin", &shared);

    let report = compare_fixture(&fixture, true).await?;
    assert!(!report.new.is_empty());
    assert!(!report.modified.is_empty());
    assert!(!report.missing.is_empty());
    assert!(!report.unchanged.is_empty());
    assert!(!report.relocated.is_empty());
    assert!(!report.duplicates.is_empty());

    let path = tokio_test::assert_ok!(ReportStore::save_in(&report, fixture.output_path()).await);
    let loaded = ReportStore::load(&path).await?;

    assert_eq!(loaded, report);
    Ok(())
}

#[tokio::test]
async fn test_journal_accumulates_across_runs() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    fixture.write_source("first.txt", b"one");

    let report = compare_fixture(&fixture, false).await?;
    apply_report(&fixture, &report, PlanOptions::default()).await?;

    fixture.write_source("second.txt", b"two");
    let report = compare_fixture(&fixture, false).await?;
    assert_eq!(report.new.len(), 1, "first file already copied");
    assert_eq!(report.new[0].relative, "second.txt");
    apply_report(&fixture, &report, PlanOptions::default()).await?;

    let journal_path = fixture.output_path().join(driftsync_engine::JOURNAL_FILE_NAME);
    let records = UpdateJournal::read_all(&journal_path).await?;
    assert_eq!(records.len(), 2);
    let run_ids: HashSet<_> = records.iter().map(|r| r.run_id).collect();
    assert_eq!(run_ids.len(), 2, "each apply has its own run id");

    // After the second apply the trees are in sync
    let report = compare_fixture(&fixture, false).await?;
    assert!(report.new.is_empty());
    assert!(report.modified.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_journal_lines_are_json_records() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    fixture.write_source("payload.txt", b"bytes");

    let report = compare_fixture(&fixture, false).await?;
    apply_report(&fixture, &report, PlanOptions::default()).await?;

    let journal_path = fixture.output_path().join(driftsync_engine::JOURNAL_FILE_NAME);
    let text = fs::read_to_string(&journal_path)?;
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 1);

    let value: serde_json::Value = serde_json::from_str(lines[0])?;
    assert_eq!(value["kind"], "copy");
    assert_eq!(value["reason"], "new");
    assert_eq!(value["relative"], "payload.txt");
    assert_eq!(value["outcome"], "success");
    assert!(value["run_id"].is_string());
    assert!(value["timestamp"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_preserved_mtime_keeps_trees_in_sync() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = SyncFixture::new();
    let src = fixture.write_source("carried.txt", b"with timestamp");
    set_mtime(&src, hours_ago(30));

    let report = compare_fixture(&fixture, false).await?;
    let summary = apply_report(&fixture, &report, PlanOptions::default()).await?;
    assert_eq!(summary.copied, 1);

    // The copied mtime matches the source, so a rescan sees no drift
    let report = compare_fixture(&fixture, false).await?;
    assert!(report.new.is_empty());
    assert!(report.modified.is_empty());
    assert_eq!(report.unchanged, vec!["carried.txt".to_string()]);
    Ok(())
}

#[test]
fn test_config_file_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("driftsync.yaml");

    let mut config = Config::default();
    config.compare.mtime_tolerance_secs = 5;
    config.compare.deep_scan = true;
    config.update.duplicate_policy = DuplicatePolicy::Skip;
    config.update.jobs = 4;

    ConfigLoader::save_to_file(&config, &path)?;
    let loaded = ConfigLoader::load_from_file(&path)?;

    assert_eq!(loaded.compare.mtime_tolerance_secs, 5);
    assert!(loaded.compare.deep_scan);
    assert_eq!(loaded.update.duplicate_policy, DuplicatePolicy::Skip);
    assert_eq!(loaded.update.jobs, 4);
    Ok(())
}

/// Build an in-memory index without touching the filesystem
fn index_from(label: &str, files: &HashMap<String, (u64, u64)>) -> TreeIndex {
    let root = PathBuf::from("/virtual").join(label);
    let mut index = TreeIndex::new(&root);
    for (relative, (size, mtime_step)) in files {
        index.insert(FileRecord::new(
            relative.clone(),
            root.join(relative),
            *size,
            UNIX_EPOCH + Duration::from_secs(mtime_step * 10),
        ));
    }
    index
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Partition invariant over arbitrary small trees: every path present in
    // either index lands in exactly one classification set.
    #[test]
    fn partition_classifies_every_path_exactly_once(
        source_files in prop::collection::hash_map("[a-c]/[a-d]\\.bin", (0u64..4, 0u64..6), 0..12),
        dest_files in prop::collection::hash_map("[a-c]/[a-d]\\.bin", (0u64..4, 0u64..6), 0..12),
    ) {
        let source = index_from("src", &source_files);
        let destination = index_from("dst", &dest_files);

        let report = futures::executor::block_on(
            CompareEngine::with_defaults().compare(&source, &destination),
        );

        let new: HashSet<&str> = report.new.iter().map(|r| r.relative.as_str()).collect();
        let modified: HashSet<&str> =
            report.modified.iter().map(|p| p.source.relative.as_str()).collect();
        let unchanged: HashSet<&str> = report.unchanged.iter().map(String::as_str).collect();
        let missing: HashSet<&str> = report.missing.iter().map(|r| r.relative.as_str()).collect();

        for path in source_files.keys() {
            let hits = u32::from(new.contains(path.as_str()))
                + u32::from(modified.contains(path.as_str()))
                + u32::from(unchanged.contains(path.as_str()));
            prop_assert_eq!(hits, 1, "source path {} classified once", path);
            prop_assert!(!missing.contains(path.as_str()));
        }

        for path in dest_files.keys() {
            if source_files.contains_key(path) {
                let hits = u32::from(modified.contains(path.as_str()))
                    + u32::from(unchanged.contains(path.as_str()));
                prop_assert_eq!(hits, 1, "shared path {} classified once", path);
            } else {
                prop_assert!(missing.contains(path.as_str()));
            }
        }

        prop_assert_eq!(
            new.len() + modified.len() + unchanged.len(),
            source_files.len()
        );
        let expected_missing = dest_files
            .keys()
            .filter(|k| !source_files.contains_key(*k))
            .count();
        prop_assert_eq!(missing.len(), expected_missing);
    }
}
