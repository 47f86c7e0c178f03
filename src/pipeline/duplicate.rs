use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use super::{Buffering, Stage};
use crate::cancel::CancellationToken;
use crate::config::TieBreak;
use crate::error::JettisonError;
use crate::executor::{DeleteExecutor, Trigger};
use crate::hashing::{ContentDigest, digest_file};
use crate::queue::{self, RecordReceiver, RecordSender};
use crate::record::FileRecord;

type Digester = fn(&Path) -> Result<ContentDigest, JettisonError>;

/// Keeps the newest file per content digest and deletes older copies.
///
/// Only one record per distinct digest is buffered. Survivors are emitted once
/// upstream is exhausted, in no particular order.
pub struct DuplicateStage<'a> {
    exec: &'a DeleteExecutor<'a>,
    tie_break: TieBreak,
    digester: Digester,
    retained: HashMap<ContentDigest, FileRecord>,
}

impl<'a> DuplicateStage<'a> {
    pub fn new(exec: &'a DeleteExecutor<'a>, tie_break: TieBreak) -> Self {
        Self::with_digester(exec, tie_break, digest_file)
    }

    pub(crate) fn with_digester(
        exec: &'a DeleteExecutor<'a>,
        tie_break: TieBreak,
        digester: Digester,
    ) -> Self {
        Self {
            exec,
            tie_break,
            digester,
            retained: HashMap::new(),
        }
    }

    /// Admit one record, deleting whichever copy loses. Returns the record
    /// back if it could not be hashed.
    fn admit(&mut self, record: FileRecord, cancel: &CancellationToken) -> Option<FileRecord> {
        let digest = match (self.digester)(&record.path) {
            Ok(digest) => digest,
            Err(err) => {
                self.exec.log().warn(format!(
                    "Can't compute hash of file '{}'. skipping...: {err}",
                    record.path.display()
                ));
                return Some(record);
            }
        };
        self.exec
            .log()
            .debug(format!("{digest} {}", record.path.display()));

        let loser = match self.retained.entry(digest) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                return None;
            }
            Entry::Occupied(mut slot) => {
                if incoming_wins(self.tie_break, slot.get(), &record) {
                    slot.insert(record)
                } else {
                    record
                }
            }
        };

        self.exec.delete(&loser, Trigger::SameFile, cancel);
        None
    }
}

fn incoming_wins(tie_break: TieBreak, stored: &FileRecord, incoming: &FileRecord) -> bool {
    match stored.modified_at.cmp(&incoming.modified_at) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => tie_break == TieBreak::KeepIncoming,
    }
}

impl Stage for DuplicateStage<'_> {
    fn name(&self) -> &'static str {
        "same-file"
    }

    fn buffering(&self) -> Buffering {
        Buffering::PerDigest
    }

    fn run(&mut self, input: RecordReceiver, output: RecordSender, cancel: &CancellationToken) {
        while let Some(record) = queue::recv(&input, cancel) {
            if let Some(unhashed) = self.admit(record, cancel)
                && !queue::send(&output, unhashed, cancel)
            {
                return;
            }
        }
        if cancel.is_cancelled() {
            return;
        }

        for (_, survivor) in self.retained.drain() {
            if !queue::send(&output, survivor, cancel) {
                return;
            }
        }
    }
}
