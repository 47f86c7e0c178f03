//! Command-line interface definitions for jettison.
//!
//! This module defines the CLI structure using clap. The main entry point is
//! the [`Cli`] struct, which carries output options in [`GlobalOpts`] and the
//! retention policy in [`PolicyOpts`].
//!
//! # Example
//!
//! ```no_run
//! use jettison::cli::Cli;
//!
//! let cli = Cli::parse_args();
//! if let Some(size) = cli.policy().max_size() {
//!     println!("Keeping usage under {size}");
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::config::{RetentionConfig, TieBreak};
use crate::error::Result;
use crate::queue::QueueBound;

/// Main command-line interface for jettison.
#[derive(Debug, Parser)]
#[command(
    name = "jettison",
    author,
    version,
    about = "Delete old files one by one when a trigger fires",
    long_about = "Deletes old files one by one when a trigger fires: the folder grows past a \
                  size budget, or a newer file with exactly the same content exists. This \
                  gives round-robin data management for folders you never want to clean by \
                  hand."
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(flatten)]
    policy: PolicyOpts,
}

/// Output options that apply to every run.
#[derive(Debug, Parser)]
pub struct GlobalOpts {
    /// Append log lines to this file instead of stderr
    #[arg(long, env = "JETTISON_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// More verbose log messages
    #[arg(short, long, action = clap::ArgAction::Count, env = "JETTISON_VERBOSE")]
    verbose: u8,

    /// Only warnings plus the start and end lines
    #[arg(short, long, conflicts_with = "verbose", env = "JETTISON_QUIET")]
    quiet: bool,
}

impl GlobalOpts {
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Which files to delete and how.
#[derive(Debug, Parser)]
pub struct PolicyOpts {
    /// Target folder to enforce the policy on
    #[arg(long, env = "JETTISON_FOLDER")]
    folder: PathBuf,

    /// Delete the oldest files while the folder exceeds this size (e.g. "3MB")
    #[arg(long, env = "JETTISON_MAX_SIZE")]
    max_size: Option<String>,

    /// Delete files older than a newer file with exactly the same data
    #[arg(long, env = "JETTISON_SAME_FILE")]
    same_file: bool,

    /// What to do with a selected file
    #[arg(long, value_enum, default_value_t = ActionKind::Erase, env = "JETTISON_DELETE_ACTION")]
    delete_action: ActionKind,

    /// Destination for '--delete-action move'
    #[arg(long, env = "JETTISON_DELETED_FOLDER")]
    deleted_folder: Option<PathBuf>,

    /// Skip files and folders whose '/'-separated path matches this regex
    #[arg(long, env = "JETTISON_IGNORE")]
    ignore: Option<String>,

    /// Which duplicate survives when both have the same modification time
    #[arg(long, value_enum, default_value_t = TieBreakArg::KeepExisting, env = "JETTISON_TIE_BREAK")]
    tie_break: TieBreakArg,

    /// Bound every stage queue to this many files (unbounded by default)
    #[arg(long, env = "JETTISON_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Log what would be deleted without deleting anything
    #[arg(long, env = "JETTISON_DRY_RUN")]
    dry_run: bool,
}

impl PolicyOpts {
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn max_size(&self) -> Option<&str> {
        self.max_size.as_deref()
    }

    pub fn same_file(&self) -> bool {
        self.same_file
    }

    pub fn delete_action(&self) -> ActionKind {
        self.delete_action
    }

    pub fn deleted_folder(&self) -> Option<&Path> {
        self.deleted_folder.as_deref()
    }

    pub fn ignore(&self) -> Option<&str> {
        self.ignore.as_deref()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Validate the options into a [`RetentionConfig`]
    pub fn to_config(&self) -> Result<RetentionConfig> {
        RetentionConfig::builder()
            .folder(&self.folder)
            .max_size(self.max_size.as_deref())
            .same_file(self.same_file)
            .delete_action(self.delete_action.as_str())
            .deleted_folder(self.deleted_folder.as_deref())
            .ignore(self.ignore.as_deref())
            .tie_break(self.tie_break.into())
            .queue_bound(
                self.queue_capacity
                    .map_or(QueueBound::Unbounded, QueueBound::Bounded),
            )
            .dry_run(self.dry_run)
            .build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionKind {
    /// Erase a file without passing through trash
    Erase,
    /// Move to --deleted-folder
    Move,
    /// Move to trash
    Trash,
}

impl ActionKind {
    fn as_str(self) -> &'static str {
        match self {
            ActionKind::Erase => "erase",
            ActionKind::Move => "move",
            ActionKind::Trash => "trash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TieBreakArg {
    KeepExisting,
    KeepIncoming,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::KeepExisting => TieBreak::KeepExisting,
            TieBreakArg::KeepIncoming => TieBreak::KeepIncoming,
        }
    }
}

impl Cli {
    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the retention policy options
    pub fn policy(&self) -> &PolicyOpts {
        &self.policy
    }

    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
