use std::fmt;
use std::fs;

use crate::cancel::CancellationToken;
use crate::config::DeleteAction;
use crate::counters::Counters;
use crate::error::JettisonError;
use crate::logging::Logger;
use crate::record::FileRecord;
use crate::size::format_size;

/// The policy that selected a file for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    MaxSize,
    SameFile,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::MaxSize => "--max-size",
            Trigger::SameFile => "--same-file",
        })
    }
}

/// Result of handing one record to the executor.
#[derive(Debug)]
pub enum Outcome {
    Deleted,
    Failed(JettisonError),
    /// The run was cancelled before the attempt started
    Cancelled,
}

/// Applies the configured [`DeleteAction`] to one record at a time.
///
/// This is the only writer of the deletion counters. Each call makes exactly
/// one attempt; failures are counted and logged, never retried.
#[derive(Debug)]
pub struct DeleteExecutor<'a> {
    action: &'a DeleteAction,
    counters: &'a Counters,
    log: &'a Logger,
    dry_run: bool,
}

impl<'a> DeleteExecutor<'a> {
    pub fn new(
        action: &'a DeleteAction,
        counters: &'a Counters,
        log: &'a Logger,
        dry_run: bool,
    ) -> Self {
        Self {
            action,
            counters,
            log,
            dry_run,
        }
    }

    pub fn counters(&self) -> &Counters {
        self.counters
    }

    pub fn log(&self) -> &Logger {
        self.log
    }

    pub fn delete(
        &self,
        record: &FileRecord,
        trigger: Trigger,
        cancel: &CancellationToken,
    ) -> Outcome {
        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }

        if self.dry_run {
            self.log.info(format!(
                "Would delete '{}' (Size: {}, Trigger: {trigger})",
                record.path.display(),
                format_size(record.size)
            ));
            self.counters.record_deleted(record.size);
            return Outcome::Deleted;
        }

        match apply(self.action, record) {
            Ok(()) => {
                self.counters.record_deleted(record.size);
                self.log.info(format!(
                    "Deleted '{}' (Size: {}, Trigger: {trigger})",
                    record.path.display(),
                    format_size(record.size)
                ));
                Outcome::Deleted
            }
            Err(err) => {
                self.counters.record_failed();
                self.log.warn(format!(
                    "Cannot delete '{}'. skipping...: {}",
                    record.path.display(),
                    describe(&err)
                ));
                Outcome::Failed(err)
            }
        }
    }
}

fn apply(action: &DeleteAction, record: &FileRecord) -> Result<(), JettisonError> {
    match action {
        DeleteAction::Erase => {
            fs::remove_file(&record.path).map_err(|source| JettisonError::DeletionFailed {
                path: record.path.clone(),
                source,
            })
        }
        DeleteAction::Move(_) | DeleteAction::Trash => Err(JettisonError::UnsupportedAction {
            action: action.name(),
        }),
    }
}

/// Error message including its immediate source, for single-line logs.
fn describe(err: &JettisonError) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}
