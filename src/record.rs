use std::path::PathBuf;
use std::time::SystemTime;

/// A regular file as observed once at scan time.
///
/// Records are never re-stat'd; they move through the pipeline by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub modified_at: SystemTime,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified_at: SystemTime) -> Self {
        Self {
            path: path.into(),
            size,
            modified_at,
        }
    }
}
