//! Error types for jettison.
//!
//! This module defines all error types used throughout jettison, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All errors derive from [`JettisonError`]
//! - Configuration-class errors ([`JettisonError::ConfigError`],
//!   [`JettisonError::InvalidSize`], [`JettisonError::InvalidIgnorePattern`],
//!   [`JettisonError::LogSinkError`]) are fatal and surface before the first
//!   file is touched
//! - Per-file errors ([`JettisonError::IoError`],
//!   [`JettisonError::DeletionFailed`], [`JettisonError::UnsupportedAction`])
//!   are logged and counted by the pipeline, never propagated out of a run
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use jettison::error::{JettisonError, Result};
//!
//! fn check_root(path: &Path) -> Result<()> {
//!     if !path.is_dir() {
//!         return Err(JettisonError::ConfigError {
//!             message: format!("'{}' is not a directory", path.display()),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in jettison operations
#[derive(Error, Debug, Diagnostic)]
pub enum JettisonError {
    /// The retention configuration is invalid.
    ///
    /// Raised before scanning when no trigger is enabled, when the `move`
    /// action lacks a destination folder, or when the target folder is not a
    /// directory.
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(jettison::config::error),
        help("Specify --folder and at least one of --max-size or --same-file.")
    )]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Invalid size literal for --max-size.
    ///
    /// Valid literals are digits followed by an optional unit letter (B, K,
    /// M, G or T, case-sensitive, powers of 1024) and an optional trailing
    /// `B`.
    #[error("Invalid size: '{value}' - {reason}")]
    #[diagnostic(
        code(jettison::config::invalid_size),
        help("Specify a size like '512', '64K', '3MB' or '1GB'.")
    )]
    InvalidSize {
        /// The literal that failed to parse
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The --ignore pattern is not a valid regular expression.
    #[error("Invalid ignore pattern '{pattern}'")]
    #[diagnostic(
        code(jettison::config::invalid_ignore),
        help("The pattern is matched against '/'-separated paths.")
    )]
    InvalidIgnorePattern {
        /// The pattern as given
        pattern: String,
        /// The regex compilation error
        #[source]
        source: regex::Error,
    },

    /// The log file could not be opened for appending.
    #[error("Cannot open log file '{path}'")]
    #[diagnostic(
        code(jettison::log::open_error),
        help("Ensure the parent directory exists and is writable.")
    )]
    LogSinkError {
        /// The log file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File system I/O error while inspecting or hashing a file.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(jettison::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Attempted to hash something other than a regular file.
    #[error("Invalid file type for '{path}': {message}")]
    #[diagnostic(code(jettison::file::invalid_type))]
    InvalidFileType {
        /// The path of the invalid file
        path: PathBuf,
        /// Description of the file type issue
        message: String,
    },

    /// The delete action failed for a single file.
    #[error("Failed to delete '{path}'")]
    #[diagnostic(code(jettison::delete::failed))]
    DeletionFailed {
        /// The file that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configured delete action has no implementation yet.
    #[error("Delete action '{action}' is not implemented")]
    #[diagnostic(
        code(jettison::delete::unsupported),
        help("Use '--delete-action erase'.")
    )]
    UnsupportedAction {
        /// Name of the action
        action: &'static str,
    },

    /// The interrupt watcher could not be started.
    #[error("Cannot install interrupt handler")]
    #[diagnostic(code(jettison::signal::install_error))]
    SignalHandlerError {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A pipeline worker thread panicked.
    #[error("Pipeline stage '{stage}' terminated abnormally")]
    #[diagnostic(code(jettison::pipeline::stage_failed))]
    StageFailed {
        /// Name of the stage
        stage: &'static str,
    },
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, JettisonError>;
