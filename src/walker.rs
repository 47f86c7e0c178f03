use std::path::Path;

use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::cancel::CancellationToken;
use crate::counters::Counters;
use crate::logging::Logger;
use crate::queue::{self, RecordSender};
use crate::record::FileRecord;

/// Recursive lister of regular files below a root.
///
/// Symbolic links are neither followed nor yielded. A file is skipped when
/// its own `/`-separated path matches the ignore pattern; directories are
/// always descended into. Traversal order is whatever the filesystem returns.
pub struct Walker<'a> {
    root: &'a Path,
    ignore: Option<&'a Regex>,
    counters: &'a Counters,
    log: &'a Logger,
}

impl<'a> Walker<'a> {
    pub fn new(
        root: &'a Path,
        ignore: Option<&'a Regex>,
        counters: &'a Counters,
        log: &'a Logger,
    ) -> Self {
        Self {
            root,
            ignore,
            counters,
            log,
        }
    }

    /// Lazily yield one record per regular file.
    ///
    /// Scan counters are bumped as each record is produced, so anything
    /// downstream of the iterator always sees them already accounted for.
    pub fn records(&self) -> impl Iterator<Item = FileRecord> + '_ {
        WalkDir::new(self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    self.log
                        .warn(format!("Cannot inspect '{path}'. skipping...: {err}"));
                    None
                }
            })
            .filter(move |entry| entry.file_type().is_file())
            .filter(move |entry| {
                if self.matches_ignore(entry.path()) {
                    self.log.info(format!("Skipped {}", entry.path().display()));
                    return false;
                }
                true
            })
            .filter_map(move |entry| self.to_record(&entry))
            .inspect(move |record| self.counters.record_scanned(record.size))
    }

    /// Feed every record into `output` until exhausted or cancelled.
    pub fn run(&self, output: RecordSender, cancel: &CancellationToken) {
        for record in self.records() {
            if !queue::send(&output, record, cancel) {
                self.log.debug("Walker stopped early");
                break;
            }
        }
    }

    fn matches_ignore(&self, path: &Path) -> bool {
        self.ignore
            .is_some_and(|re| re.is_match(&normalize_separators(path)))
    }

    fn to_record(&self, entry: &DirEntry) -> Option<FileRecord> {
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                self.log.warn(format!(
                    "Cannot stat '{}'. skipping...: {err}",
                    entry.path().display()
                ));
                return None;
            }
        };
        let modified_at = match metadata.modified() {
            Ok(time) => time,
            Err(err) => {
                self.log.warn(format!(
                    "Cannot read mtime of '{}'. skipping...: {err}",
                    entry.path().display()
                ));
                return None;
            }
        };
        Some(FileRecord::new(entry.path(), metadata.len(), modified_at))
    }
}

/// Render a path with `/` separators regardless of platform.
pub fn normalize_separators(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
