use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use proptest::prelude::*;

use super::{BudgetStage, DuplicateStage, Stage};
use crate::cancel::CancellationToken;
use crate::config::{DeleteAction, TieBreak};
use crate::counters::Counters;
use crate::error::JettisonError;
use crate::executor::DeleteExecutor;
use crate::hashing::ContentDigest;
use crate::logging::{CaptureBuffer, Logger};
use crate::queue::{self, QueueBound};
use crate::record::FileRecord;

// Helper functions

fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 + secs)
}

fn quiet_log() -> Logger {
    Logger::with_writer(CaptureBuffer::new(), 0, false)
}

/// Digest derived from the parent directory name, so `h1/a` and `h1/b` are
/// duplicates without touching the filesystem.
fn digest_by_parent(path: &Path) -> Result<ContentDigest, JettisonError> {
    let parent = path.parent().unwrap_or(Path::new(""));
    Ok(ContentDigest::of_bytes(parent.to_string_lossy().as_bytes()))
}

fn digest_unless_unreadable(path: &Path) -> Result<ContentDigest, JettisonError> {
    if path.ends_with("unreadable") {
        return Err(JettisonError::IoError {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
    }
    digest_by_parent(path)
}

fn scan(counters: &Counters, records: &[FileRecord]) {
    for record in records {
        counters.record_scanned(record.size);
    }
}

/// Push `records` through `stage` and collect what it emits.
fn run_stage(stage: &mut dyn Stage, records: Vec<FileRecord>) -> Vec<FileRecord> {
    let cancel = CancellationToken::new();
    let (tx, rx) = queue::queue(QueueBound::Unbounded);
    for record in records {
        tx.send(record).unwrap();
    }
    drop(tx);
    let (out_tx, out_rx) = queue::queue(QueueBound::Unbounded);
    stage.run(rx, out_tx, &cancel);
    out_rx.iter().collect()
}

fn paths(records: &[FileRecord]) -> Vec<PathBuf> {
    let mut paths: Vec<_> = records.iter().map(|r| r.path.clone()).collect();
    paths.sort();
    paths
}

// Size-budget stage

#[test]
fn test_budget_deletes_oldest_until_within_budget() {
    let records = vec![
        FileRecord::new("B", 50, at(2)),
        FileRecord::new("A", 60, at(1)),
        FileRecord::new("C", 40, at(3)),
    ];
    let counters = Counters::new();
    scan(&counters, &records);
    let log = quiet_log();
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);

    let survivors = run_stage(&mut BudgetStage::new(&exec, 100), records);

    assert_eq!(paths(&survivors), vec![PathBuf::from("B"), PathBuf::from("C")]);
    let stats = counters.snapshot();
    assert_eq!(stats.deleted_count, 1);
    assert_eq!(stats.deleted_bytes, 60);
}

#[test]
fn test_budget_already_satisfied() {
    let records = vec![
        FileRecord::new("A", 10, at(1)),
        FileRecord::new("B", 10, at(2)),
    ];
    let counters = Counters::new();
    scan(&counters, &records);
    let log = quiet_log();
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);

    let survivors = run_stage(&mut BudgetStage::new(&exec, 20), records);

    assert_eq!(survivors.len(), 2);
    assert_eq!(counters.snapshot().deleted_count, 0);
}

#[test]
fn test_budget_uses_scanned_total_not_stage_input() {
    // Upstream removed a 90 byte file; the stage still starts from 130
    let counters = Counters::new();
    scan(&counters, &[FileRecord::new("gone", 90, at(0))]);
    let records = vec![
        FileRecord::new("A", 30, at(1)),
        FileRecord::new("B", 10, at(2)),
    ];
    scan(&counters, &records);
    let log = quiet_log();
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);

    let survivors = run_stage(&mut BudgetStage::new(&exec, 100), records);

    // 130 > 100, so A goes even though A + B = 40 fits
    assert_eq!(paths(&survivors), vec![PathBuf::from("B")]);
}

#[test]
fn test_budget_failed_deletion_does_not_reduce_usage() {
    let records = vec![
        FileRecord::new("A", 60, at(1)),
        FileRecord::new("B", 50, at(2)),
        FileRecord::new("C", 40, at(3)),
    ];
    let counters = Counters::new();
    scan(&counters, &records);
    let buf = CaptureBuffer::new();
    let log = Logger::with_writer(buf.clone(), 0, false);
    let action = DeleteAction::Trash;
    let exec = DeleteExecutor::new(&action, &counters, &log, false);

    let survivors = run_stage(&mut BudgetStage::new(&exec, 100), records);

    // Every attempt fails, so every record is tried and none survive
    assert!(survivors.is_empty());
    let stats = counters.snapshot();
    assert_eq!(stats.failed_count, 3);
    assert_eq!(stats.deleted_count, 0);
    assert!(buf.contents().contains("Could not get under"));
}

#[test]
fn test_budget_zero_deletes_everything() {
    let records = vec![
        FileRecord::new("A", 1, at(1)),
        FileRecord::new("B", 1, at(2)),
    ];
    let counters = Counters::new();
    scan(&counters, &records);
    let log = quiet_log();
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);

    let survivors = run_stage(&mut BudgetStage::new(&exec, 0), records);

    assert!(survivors.is_empty());
    assert_eq!(counters.snapshot().deleted_count, 2);
}

// Duplicate stage

#[test]
fn test_duplicate_keeps_newest() {
    let counters = Counters::new();
    let log = quiet_log();
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);
    let mut stage = DuplicateStage::with_digester(&exec, TieBreak::KeepExisting, digest_by_parent);

    let survivors = run_stage(
        &mut stage,
        vec![
            FileRecord::new("h1/A", 5, at(1)),
            FileRecord::new("h1/B", 5, at(2)),
        ],
    );

    assert_eq!(paths(&survivors), vec![PathBuf::from("h1/B")]);
    assert_eq!(counters.snapshot().deleted_count, 1);
}

#[test]
fn test_duplicate_older_incoming_is_deleted() {
    let counters = Counters::new();
    let log = quiet_log();
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);
    let mut stage = DuplicateStage::with_digester(&exec, TieBreak::KeepExisting, digest_by_parent);

    let survivors = run_stage(
        &mut stage,
        vec![
            FileRecord::new("h1/new", 5, at(9)),
            FileRecord::new("h1/old", 5, at(1)),
            FileRecord::new("h2/other", 7, at(1)),
        ],
    );

    assert_eq!(
        paths(&survivors),
        vec![PathBuf::from("h1/new"), PathBuf::from("h2/other")]
    );
    assert_eq!(counters.snapshot().deleted_bytes, 5);
}

#[test]
fn test_duplicate_tie_break_policies() {
    let cases = [
        (TieBreak::KeepExisting, "h1/first"),
        (TieBreak::KeepIncoming, "h1/second"),
    ];

    for (tie_break, expected) in cases {
        let counters = Counters::new();
        let log = quiet_log();
        let action = DeleteAction::Erase;
        let exec = DeleteExecutor::new(&action, &counters, &log, true);
        let mut stage = DuplicateStage::with_digester(&exec, tie_break, digest_by_parent);

        let survivors = run_stage(
            &mut stage,
            vec![
                FileRecord::new("h1/first", 3, at(4)),
                FileRecord::new("h1/second", 3, at(4)),
            ],
        );

        assert_eq!(paths(&survivors), vec![PathBuf::from(expected)], "{tie_break:?}");
    }
}

#[test]
fn test_duplicate_unhashable_record_is_forwarded() {
    let counters = Counters::new();
    let buf = CaptureBuffer::new();
    let log = Logger::with_writer(buf.clone(), 0, false);
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);
    let mut stage =
        DuplicateStage::with_digester(&exec, TieBreak::KeepExisting, digest_unless_unreadable);

    let survivors = run_stage(
        &mut stage,
        vec![
            FileRecord::new("h1/unreadable", 3, at(1)),
            FileRecord::new("h1/readable", 3, at(2)),
        ],
    );

    assert_eq!(survivors.len(), 2);
    assert_eq!(counters.snapshot().deleted_count, 0);
    assert!(buf.contents().contains("Can't compute hash"));
}

#[test]
fn test_cancelled_stage_emits_nothing() {
    let counters = Counters::new();
    let log = quiet_log();
    let action = DeleteAction::Erase;
    let exec = DeleteExecutor::new(&action, &counters, &log, true);
    let mut stage = DuplicateStage::with_digester(&exec, TieBreak::KeepExisting, digest_by_parent);

    let cancel = CancellationToken::new();
    let (tx, rx) = queue::queue(QueueBound::Unbounded);
    tx.send(FileRecord::new("h1/A", 1, at(1))).unwrap();
    cancel.cancel();
    let (out_tx, out_rx) = queue::queue(QueueBound::Unbounded);
    stage.run(rx, out_tx, &cancel);

    assert_eq!(out_rx.iter().count(), 0);
    assert_eq!(counters.snapshot(), Default::default());
}

// Property tests

fn budget_input_strategy() -> impl Strategy<Value = (Vec<(u64, u64)>, u64)> {
    (
        prop::collection::vec((0u64..200, 0u64..50), 0..20),
        0u64..1500,
    )
}

fn duplicate_input_strategy() -> impl Strategy<Value = Vec<(u8, u64)>> {
    prop::collection::vec((0u8..4, 0u64..10), 0..20)
}

proptest! {
    #[test]
    fn test_budget_evicts_oldest_prefix_and_converges((files, budget) in budget_input_strategy()) {
        let records: Vec<_> = files
            .iter()
            .enumerate()
            .map(|(i, (size, secs))| FileRecord::new(format!("f{i}"), *size, at(*secs)))
            .collect();
        let mut sorted = records.clone();
        sorted.sort_by_key(|r| r.modified_at);

        let counters = Counters::new();
        scan(&counters, &records);
        let log = quiet_log();
        let action = DeleteAction::Erase;
        let exec = DeleteExecutor::new(&action, &counters, &log, true);

        let survivors = run_stage(&mut BudgetStage::new(&exec, budget), records);

        let deleted = counters.snapshot().deleted_count as usize;
        prop_assert_eq!(&survivors[..], &sorted[deleted..]);

        let survivor_bytes: u64 = survivors.iter().map(|r| r.size).sum();
        prop_assert!(survivor_bytes <= budget || deleted == sorted.len());

        // Stops at the first point the budget holds
        if deleted > 0 {
            let kept_before_last: u64 = sorted[deleted - 1..].iter().map(|r| r.size).sum();
            prop_assert!(kept_before_last > budget);
        }
    }

    #[test]
    fn test_duplicate_resolution_is_idempotent(files in duplicate_input_strategy()) {
        let records: Vec<_> = files
            .iter()
            .enumerate()
            .map(|(i, (group, secs))| FileRecord::new(format!("h{group}/f{i}"), 1, at(*secs)))
            .collect();

        let mut newest: HashMap<PathBuf, SystemTime> = HashMap::new();
        for record in &records {
            let group = record.path.parent().unwrap().to_path_buf();
            let entry = newest.entry(group).or_insert(record.modified_at);
            *entry = (*entry).max(record.modified_at);
        }

        let counters = Counters::new();
        let log = quiet_log();
        let action = DeleteAction::Erase;
        let exec = DeleteExecutor::new(&action, &counters, &log, true);

        let mut stage = DuplicateStage::with_digester(&exec, TieBreak::KeepExisting, digest_by_parent);
        let survivors = run_stage(&mut stage, records.clone());

        let groups: HashSet<_> = survivors.iter().map(|r| r.path.parent().unwrap()).collect();
        prop_assert_eq!(groups.len(), survivors.len());
        prop_assert_eq!(survivors.len(), newest.len());
        for survivor in &survivors {
            prop_assert_eq!(survivor.modified_at, newest[survivor.path.parent().unwrap()]);
        }
        prop_assert_eq!(
            counters.snapshot().deleted_count as usize,
            records.len() - survivors.len()
        );

        let deleted_before = counters.snapshot().deleted_count;
        let mut again = DuplicateStage::with_digester(&exec, TieBreak::KeepExisting, digest_by_parent);
        let second = run_stage(&mut again, survivors.clone());
        prop_assert_eq!(paths(&second), paths(&survivors));
        prop_assert_eq!(counters.snapshot().deleted_count, deleted_before);
    }
}
