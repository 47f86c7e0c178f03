//! Hand-off queues between pipeline stages.
//!
//! Each stage pair is connected by one queue. An unbounded queue never blocks
//! the sender; a bounded queue blocks it until the consumer catches up. Both
//! ends give up as soon as the run's [`CancellationToken`] fires.

use crossbeam_channel::{Receiver, Sender, select};

use crate::cancel::CancellationToken;
use crate::record::FileRecord;

/// Capacity policy for a stage-to-stage queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueBound {
    #[default]
    Unbounded,
    Bounded(usize),
}

pub type RecordSender = Sender<FileRecord>;
pub type RecordReceiver = Receiver<FileRecord>;

pub fn queue(bound: QueueBound) -> (RecordSender, RecordReceiver) {
    match bound {
        QueueBound::Unbounded => crossbeam_channel::unbounded(),
        // A zero-capacity queue is a rendezvous, which still makes progress.
        QueueBound::Bounded(cap) => crossbeam_channel::bounded(cap),
    }
}

/// Receive the next record. `None` when upstream is exhausted or the run was
/// cancelled.
pub fn recv(input: &RecordReceiver, cancel: &CancellationToken) -> Option<FileRecord> {
    if cancel.is_cancelled() {
        return None;
    }
    select! {
        recv(input) -> msg => msg.ok(),
        recv(cancel.receiver()) -> _ => None,
    }
}

/// Hand a record downstream. `false` when the consumer is gone or the run was
/// cancelled; the record is dropped in that case.
pub fn send(output: &RecordSender, record: FileRecord, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    select! {
        send(output, record) -> res => res.is_ok(),
        recv(cancel.receiver()) -> _ => false,
    }
}
