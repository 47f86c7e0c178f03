use std::time::{Duration, SystemTime};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use jettison::logging::{CaptureBuffer, Logger};

/// A temporary data folder whose files get explicit modification times.
pub struct DataDir {
    dir: TempDir,
    epoch: SystemTime,
}

impl DataDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            epoch: SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60),
        }
    }

    /// Write `content` to `name` and stamp it `age_rank` seconds after the
    /// epoch, so larger ranks are newer.
    pub fn file(&self, name: &str, content: &[u8], age_rank: u64) -> assert_fs::fixture::ChildPath {
        let child = self.dir.child(name);
        child.write_binary(content).unwrap();
        let mtime = self.epoch + Duration::from_secs(age_rank);
        filetime::set_file_mtime(child.path(), filetime::FileTime::from_system_time(mtime))
            .unwrap();
        child
    }

    /// Write `size` filler bytes unique to `name`.
    pub fn sized(&self, name: &str, size: usize, age_rank: u64) -> assert_fs::fixture::ChildPath {
        let mut content = name.as_bytes().to_vec();
        content.resize(size.max(name.len()), b'.');
        content.truncate(size);
        self.file(name, &content, age_rank)
    }
}

impl std::ops::Deref for DataDir {
    type Target = TempDir;

    fn deref(&self) -> &Self::Target {
        &self.dir
    }
}

#[allow(dead_code)]
pub fn capture_logger(verbose: u8) -> (Logger, CaptureBuffer) {
    let buf = CaptureBuffer::new();
    (Logger::with_writer(buf.clone(), verbose, false), buf)
}
