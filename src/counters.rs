use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide run counters.
///
/// Scan counters are only bumped by the walker and deletion counters only by
/// the delete executor. Everyone else reads a [`RunStats`] snapshot.
#[derive(Debug, Default)]
pub struct Counters {
    scanned_count: AtomicU64,
    scanned_bytes: AtomicU64,
    deleted_count: AtomicU64,
    deleted_bytes: AtomicU64,
    failed_count: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_scanned(&self, size: u64) {
        self.scanned_count.fetch_add(1, Ordering::SeqCst);
        self.scanned_bytes.fetch_add(size, Ordering::SeqCst);
    }

    pub(crate) fn record_deleted(&self, size: u64) {
        self.deleted_count.fetch_add(1, Ordering::SeqCst);
        self.deleted_bytes.fetch_add(size, Ordering::SeqCst);
    }

    pub(crate) fn record_failed(&self) {
        self.failed_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn scanned_bytes(&self) -> u64 {
        self.scanned_bytes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> RunStats {
        RunStats {
            scanned_count: self.scanned_count.load(Ordering::SeqCst),
            scanned_bytes: self.scanned_bytes.load(Ordering::SeqCst),
            deleted_count: self.deleted_count.load(Ordering::SeqCst),
            deleted_bytes: self.deleted_bytes.load(Ordering::SeqCst),
            failed_count: self.failed_count.load(Ordering::SeqCst),
        }
    }
}

/// Point-in-time copy of [`Counters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub scanned_count: u64,
    pub scanned_bytes: u64,
    pub deleted_count: u64,
    pub deleted_bytes: u64,
    pub failed_count: u64,
}
