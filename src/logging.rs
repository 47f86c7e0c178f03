//! Leveled log sink.
//!
//! Every line has the shape `[LEVEL] [timestamp] message`. START and END
//! lines bracket a run and are written regardless of verbosity.

use std::fmt::{self, Display};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::error::{JettisonError, Result};

/// Severity of a log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Start,
    End,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Minimum threshold at which this level is written. START/END have none.
    fn threshold(self) -> Option<i8> {
        match self {
            Level::Start | Level::End => None,
            Level::Warn => Some(0),
            Level::Info => Some(1),
            Level::Debug => Some(2),
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Start => "START",
            Level::End => "END",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        })
    }
}

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Clone)]
pub struct Logger {
    threshold: i8,
    sink: Sink,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger writing to stderr. INFO by default, each `verbose` step adds a
    /// level and `quiet` drops to WARN.
    pub fn new(verbose: u8, quiet: bool) -> Self {
        Self::with_writer(io::stderr(), verbose, quiet)
    }

    /// Logger appending to `path`, creating the file if needed.
    pub fn to_file(path: &Path, verbose: u8, quiet: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| JettisonError::LogSinkError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::with_writer(file, verbose, quiet))
    }

    pub fn with_writer(writer: impl Write + Send + 'static, verbose: u8, quiet: bool) -> Self {
        let threshold = 1 + verbose.min(1) as i8 - quiet as i8;
        Self {
            threshold,
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.threshold().is_none_or(|t| self.threshold >= t)
    }

    pub fn log(&self, level: Level, message: impl Display) {
        if !self.enabled(level) {
            return;
        }
        let stamp = Local::now().format("%b %e %H:%M:%S%.3f");
        // A poisoned sink only means another thread panicked mid-write.
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        // Log write failures are not worth aborting a cleanup run over.
        let _ = writeln!(sink, "[{level}] [{stamp}] {message}");
        let _ = sink.flush();
    }

    pub fn start(&self, message: impl Display) {
        self.log(Level::Start, message);
    }

    pub fn end(&self, message: impl Display) {
        self.log(Level::End, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }
}

/// In-memory writer that can be inspected after a run.
#[derive(Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
