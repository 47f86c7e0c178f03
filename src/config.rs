use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{JettisonError, Result};
use crate::queue::QueueBound;
use crate::size::parse_size;

/// What happens to a file once a trigger selects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAction {
    /// Unlink the file without passing through a trash can
    Erase,
    /// Relocate the file into the given folder
    Move(PathBuf),
    /// Hand the file to the platform trash
    Trash,
}

impl DeleteAction {
    pub fn name(&self) -> &'static str {
        match self {
            DeleteAction::Erase => "erase",
            DeleteAction::Move(_) => "move",
            DeleteAction::Trash => "trash",
        }
    }
}

impl fmt::Display for DeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which record survives when two duplicates carry the same modification
/// time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Keep the record encountered first and delete the incoming one
    #[default]
    KeepExisting,
    /// Keep the incoming record and delete the one encountered first
    KeepIncoming,
}

/// Validated retention settings for one run.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    folder: PathBuf,
    ignore: Option<Regex>,
    max_size: Option<u64>,
    same_file: bool,
    action: DeleteAction,
    tie_break: TieBreak,
    queue_bound: QueueBound,
    dry_run: bool,
}

impl RetentionConfig {
    /// Creates a new builder for [`RetentionConfig`]
    pub fn builder() -> RetentionConfigBuilder {
        RetentionConfigBuilder::default()
    }

    /// Root of the tree to enforce the policy on
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Compiled ignore pattern, if any
    pub fn ignore(&self) -> Option<&Regex> {
        self.ignore.as_ref()
    }

    /// Byte budget for the size trigger
    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }

    /// Whether the duplicate trigger is enabled
    pub fn same_file(&self) -> bool {
        self.same_file
    }

    pub fn action(&self) -> &DeleteAction {
        &self.action
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn queue_bound(&self) -> QueueBound {
        self.queue_bound
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Builder for [`RetentionConfig`]
///
/// Sizes and patterns are accepted in their raw string form so that every
/// configuration error surfaces from [`RetentionConfigBuilder::build`].
#[derive(Debug, Default)]
pub struct RetentionConfigBuilder {
    folder: Option<PathBuf>,
    ignore: Option<String>,
    max_size: Option<String>,
    max_size_bytes: Option<u64>,
    same_file: bool,
    action: Option<String>,
    deleted_folder: Option<PathBuf>,
    tie_break: TieBreak,
    queue_bound: QueueBound,
    dry_run: bool,
}

impl RetentionConfigBuilder {
    pub fn folder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.folder = Some(dir.into());
        self
    }

    pub fn ignore(mut self, pattern: Option<impl Into<String>>) -> Self {
        self.ignore = pattern.map(Into::into);
        self
    }

    /// Set the budget from a size literal such as "3MB"
    pub fn max_size(mut self, literal: Option<impl Into<String>>) -> Self {
        self.max_size = literal.map(Into::into);
        self
    }

    /// Set the budget directly in bytes
    pub fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = Some(bytes);
        self
    }

    pub fn same_file(mut self, enabled: bool) -> Self {
        self.same_file = enabled;
        self
    }

    /// Set the action by name: `erase`, `move` or `trash`
    pub fn delete_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn deleted_folder(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.deleted_folder = dir.map(Into::into);
        self
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn queue_bound(mut self, bound: QueueBound) -> Self {
        self.queue_bound = bound;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Validate and build the [`RetentionConfig`]
    pub fn build(self) -> Result<RetentionConfig> {
        let folder = self.folder.ok_or_else(|| JettisonError::ConfigError {
            message: "missing required option --folder".to_string(),
        })?;

        let max_size = match (self.max_size_bytes, self.max_size.as_deref()) {
            (Some(bytes), _) => Some(bytes),
            (None, Some(literal)) => Some(parse_size(literal)?),
            (None, None) => None,
        };

        if max_size.is_none() && !self.same_file {
            return Err(JettisonError::ConfigError {
                message: "no trigger given; specify --max-size and/or --same-file".to_string(),
            });
        }

        let action = match self.action.as_deref().unwrap_or("erase") {
            "erase" => DeleteAction::Erase,
            "trash" => DeleteAction::Trash,
            "move" => match self.deleted_folder {
                Some(dest) => DeleteAction::Move(dest),
                None => {
                    return Err(JettisonError::ConfigError {
                        message: "'--delete-action move' requires --deleted-folder".to_string(),
                    });
                }
            },
            other => {
                return Err(JettisonError::ConfigError {
                    message: format!(
                        "invalid --delete-action '{other}' (expected erase, move or trash)"
                    ),
                });
            }
        };

        let ignore = match self.ignore.filter(|p| !p.is_empty()) {
            Some(pattern) => Some(Regex::new(&pattern).map_err(|source| {
                JettisonError::InvalidIgnorePattern { pattern, source }
            })?),
            None => None,
        };

        if !folder.is_dir() {
            return Err(JettisonError::ConfigError {
                message: format!("target folder '{}' is not a directory", folder.display()),
            });
        }

        Ok(RetentionConfig {
            folder,
            ignore,
            max_size,
            same_file: self.same_file,
            action,
            tie_break: self.tie_break,
            queue_bound: self.queue_bound,
            dry_run: self.dry_run,
        })
    }
}
