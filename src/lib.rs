//! # jettison
//!
//! A round-robin disk-space janitor for append-only data directories (logs,
//! captures, caches).
//!
//! ## Overview
//!
//! jettison deletes old files one by one when a trigger fires:
//!
//! - **Size budget** (`--max-size`): the folder's total size exceeds a limit,
//!   so the oldest files go until it fits again
//! - **Duplicates** (`--same-file`): a newer file with exactly the same
//!   content exists, so the older copies go
//!
//! Both triggers compose. Duplicates are resolved first, then the size
//! budget is enforced against the size of the folder as it was scanned.
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: Run driver used by the binary
//! - [`config`]: Validated retention settings and their builder
//! - [`pipeline`]: Walker, trigger stages, sink and the final report
//! - [`error`]: Error types with thiserror + miette
//!
//! Supporting modules: [`walker`] (directory traversal), [`executor`] (the
//! delete action), [`hashing`] (BLAKE3 content digests), [`queue`] (stage
//! hand-off), [`cancel`] (cooperative cancellation), [`interrupt`] (Ctrl-C),
//! [`counters`], [`logging`] and [`size`].
//!
//! ## Library Usage
//!
//! ```no_run
//! use jettison::config::RetentionConfig;
//! use jettison::logging::Logger;
//! use jettison::pipeline;
//!
//! let config = RetentionConfig::builder()
//!     .folder("captures")
//!     .max_size(Some("10G"))
//!     .build()?;
//!
//! let report = pipeline::run(&config, &Logger::new(0, false))?;
//! assert!(report.is_conserved());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Configuration problems are returned as [`error::JettisonError`] before
//! any file is touched. A file that cannot be inspected, hashed or deleted is
//! logged and counted, and the run carries on.

pub mod cancel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod counters;
pub mod error;
pub mod executor;
pub mod hashing;
pub mod interrupt;
pub mod logging;
pub mod pipeline;
pub mod queue;
pub mod record;
pub mod size;
pub mod walker;
