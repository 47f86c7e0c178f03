use crate::counters::RunStats;
use crate::logging::Logger;
use crate::size::format_size;

/// Final tallies of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub stats: RunStats,
    /// Records that reached the sink untouched
    pub surviving_count: u64,
    pub surviving_bytes: u64,
    /// True when the run stopped early; records in flight are then neither
    /// deleted, failed nor surviving
    pub cancelled: bool,
}

impl RunReport {
    /// Whether every scanned file is accounted for exactly once.
    pub fn is_conserved(&self) -> bool {
        self.stats.scanned_count
            == self.stats.deleted_count + self.stats.failed_count + self.surviving_count
    }

    pub fn log_summary(&self, log: &Logger) {
        log.info("---------- Result Report ----------");
        log.info(format!(
            "Total File(s): {} file(s) ({})",
            self.stats.scanned_count,
            format_size(self.stats.scanned_bytes)
        ));
        log.info(format!(
            "Deleted File(s): {} file(s) ({})",
            self.stats.deleted_count,
            format_size(self.stats.deleted_bytes)
        ));
        log.info(format!(
            "Current File(s): {} file(s) ({})",
            self.stats.scanned_count - self.stats.deleted_count,
            format_size(
                self.stats
                    .scanned_bytes
                    .saturating_sub(self.stats.deleted_bytes)
            )
        ));
        log.info(format!(
            "File(s) failed to delete: {} file(s)",
            self.stats.failed_count
        ));
        if self.cancelled {
            log.warn("Run was cancelled before all files were evaluated");
        }
    }
}
