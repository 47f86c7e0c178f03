use super::{Buffering, Stage};
use crate::cancel::CancellationToken;
use crate::executor::{DeleteExecutor, Outcome, Trigger};
use crate::queue::{self, RecordReceiver, RecordSender};
use crate::size::format_size;

/// Deletes the oldest files until usage fits the byte budget.
///
/// Eviction order needs every record, so nothing is emitted before upstream
/// is exhausted. The running total starts from the walker's scanned total,
/// not from what reaches this stage.
pub struct BudgetStage<'a> {
    exec: &'a DeleteExecutor<'a>,
    budget: u64,
}

impl<'a> BudgetStage<'a> {
    pub fn new(exec: &'a DeleteExecutor<'a>, budget: u64) -> Self {
        Self { exec, budget }
    }
}

impl Stage for BudgetStage<'_> {
    fn name(&self) -> &'static str {
        "max-size"
    }

    fn buffering(&self) -> Buffering {
        Buffering::Full
    }

    fn run(&mut self, input: RecordReceiver, output: RecordSender, cancel: &CancellationToken) {
        let log = self.exec.log();

        let mut buffered = Vec::new();
        while let Some(record) = queue::recv(&input, cancel) {
            buffered.push(record);
        }
        if cancel.is_cancelled() {
            return;
        }

        // Stable, so equal mtimes keep arrival order
        buffered.sort_by_key(|record| record.modified_at);

        let mut running = self.exec.counters().scanned_bytes();
        log.debug(format!(
            "Size-based cleanup: current={}, max={}, candidates={}",
            format_size(running),
            format_size(self.budget),
            buffered.len()
        ));

        let mut next = 0;
        while running > self.budget && next < buffered.len() {
            let record = &buffered[next];
            next += 1;
            match self.exec.delete(record, Trigger::MaxSize, cancel) {
                Outcome::Deleted => running = running.saturating_sub(record.size),
                // A failed file still occupies space and is not re-emitted
                Outcome::Failed(_) => {}
                Outcome::Cancelled => return,
            }
        }

        if running > self.budget {
            log.warn(format!(
                "Could not get under {}: {} still in use",
                format_size(self.budget),
                format_size(running)
            ));
        }

        for survivor in buffered.drain(next..) {
            if !queue::send(&output, survivor, cancel) {
                return;
            }
        }
    }
}
