//! The retention pipeline.
//!
//! ```text
//! Walker -> [same-file stage] -> [max-size stage] -> sink
//! ```
//!
//! Each box runs on its own scoped thread and hands records to the next one
//! through a [`queue`](crate::queue). Only the stages whose trigger is
//! configured are present, always in the order shown. The sink drains
//! whatever survives and the run finishes with a [`RunReport`].
//!
//! # Example
//!
//! ```no_run
//! use jettison::config::RetentionConfig;
//! use jettison::logging::Logger;
//! use jettison::pipeline;
//!
//! let config = RetentionConfig::builder()
//!     .folder("/var/log/captures")
//!     .max_size(Some("5G"))
//!     .same_file(true)
//!     .build()?;
//!
//! let report = pipeline::run(&config, &Logger::new(0, false))?;
//! println!("Freed {} bytes", report.stats.deleted_bytes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod budget;
mod duplicate;
mod report;
#[cfg(test)]
mod tests;

use std::thread;

pub use budget::BudgetStage;
pub use duplicate::DuplicateStage;
pub use report::RunReport;

use crate::cancel::CancellationToken;
use crate::config::RetentionConfig;
use crate::counters::Counters;
use crate::error::{JettisonError, Result};
use crate::executor::DeleteExecutor;
use crate::logging::Logger;
use crate::queue::{self, QueueBound, RecordReceiver, RecordSender};
use crate::walker::Walker;

/// How much of its input a stage holds before it can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffering {
    /// Forwards each record as it arrives
    Streaming,
    /// Holds one record per content digest
    PerDigest,
    /// Holds the entire input
    Full,
}

/// A trigger stage: consumes records, deletes some, forwards the rest.
///
/// Implementations must return once `input` is exhausted or `cancel` fires,
/// and must drop `output` on return so the next stage sees the end.
pub trait Stage: Send {
    fn name(&self) -> &'static str;

    fn buffering(&self) -> Buffering;

    fn run(&mut self, input: RecordReceiver, output: RecordSender, cancel: &CancellationToken);
}

/// Run the configured pipeline to completion.
pub fn run(config: &RetentionConfig, log: &Logger) -> Result<RunReport> {
    run_with_cancel(config, log, &CancellationToken::new())
}

/// Run the configured pipeline, stopping early if `cancel` fires.
///
/// Deletions already started when cancellation arrives finish and are
/// counted; nothing after that is attempted.
pub fn run_with_cancel(
    config: &RetentionConfig,
    log: &Logger,
    cancel: &CancellationToken,
) -> Result<RunReport> {
    let counters = Counters::new();
    let exec = DeleteExecutor::new(config.action(), &counters, log, config.dry_run());

    let mut stages: Vec<Box<dyn Stage + '_>> = Vec::new();
    if config.same_file() {
        stages.push(Box::new(DuplicateStage::new(&exec, config.tie_break())));
    }
    if let Some(budget) = config.max_size() {
        stages.push(Box::new(BudgetStage::new(&exec, budget)));
    }
    if stages.is_empty() {
        return Err(JettisonError::ConfigError {
            message: "no trigger enabled".to_string(),
        });
    }

    let walker = Walker::new(config.folder(), config.ignore(), &counters, log);
    let (surviving_count, surviving_bytes) =
        drive(walker, stages, config.queue_bound(), log, cancel)?;

    Ok(RunReport {
        stats: counters.snapshot(),
        surviving_count,
        surviving_bytes,
        cancelled: cancel.is_cancelled(),
    })
}

/// Queue feeding a stage. A stage that holds its whole input gains nothing
/// from a bounded queue in front of it.
fn inbound_bound(stage: &dyn Stage, configured: QueueBound) -> QueueBound {
    match stage.buffering() {
        Buffering::Full => QueueBound::Unbounded,
        Buffering::Streaming | Buffering::PerDigest => configured,
    }
}

fn drive(
    walker: Walker<'_>,
    stages: Vec<Box<dyn Stage + '_>>,
    bound: QueueBound,
    log: &Logger,
    cancel: &CancellationToken,
) -> Result<(u64, u64)> {
    thread::scope(|s| {
        let first_bound = stages
            .first()
            .map_or(bound, |stage| inbound_bound(stage.as_ref(), bound));
        let (walk_tx, mut upstream) = queue::queue(first_bound);
        let walker_handle = s.spawn(move || walker.run(walk_tx, cancel));

        let bounds: Vec<QueueBound> = stages
            .iter()
            .skip(1)
            .map(|stage| inbound_bound(stage.as_ref(), bound))
            .chain(std::iter::once(bound))
            .collect();

        let mut handles = Vec::with_capacity(stages.len());
        for (mut stage, out_bound) in stages.into_iter().zip(bounds) {
            log.debug(format!(
                "Stage {} buffering: {:?}, outbound queue: {:?}",
                stage.name(),
                stage.buffering(),
                out_bound
            ));
            let (tx, rx) = queue::queue(out_bound);
            let input = std::mem::replace(&mut upstream, rx);
            let name = stage.name();
            handles.push((name, s.spawn(move || stage.run(input, tx, cancel))));
        }

        // Survivors need no further action; only count them
        let mut surviving_count = 0u64;
        let mut surviving_bytes = 0u64;
        while let Some(record) = queue::recv(&upstream, cancel) {
            surviving_count += 1;
            surviving_bytes += record.size;
        }
        drop(upstream);

        walker_handle
            .join()
            .map_err(|_| JettisonError::StageFailed { stage: "walker" })?;
        for (stage, handle) in handles {
            handle
                .join()
                .map_err(|_| JettisonError::StageFailed { stage })?;
        }

        Ok((surviving_count, surviving_bytes))
    })
}
