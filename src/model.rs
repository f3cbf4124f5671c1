//! Plan and result types shared by the planner, executor and report renderer.

use crate::error::{MoveFailure, PlanWarning};
use crate::file_category::extension_of;
use crate::rule::OrganizationRule;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot of a file taken while planning.
///
/// Attributes are read once during the walk and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Path relative to the scan root.
    pub relative_path: PathBuf,
    /// Final path component exactly as stored on disk.
    #[serde(skip)]
    pub file_name: OsString,
    /// `file_name` as text, for grouping and display. Not valid UTF-8 means
    /// this differs from `file_name`.
    pub name: String,
    /// Lowercased extension without the leading dot.
    pub extension: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time in local time, if the platform reports one.
    pub modified: Option<DateTime<Local>>,
}

impl FileEntry {
    /// Builds an entry from a relative path and raw attributes.
    pub fn new(relative_path: PathBuf, size: u64, modified: Option<DateTime<Local>>) -> Self {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let name = file_name.to_string_lossy().into_owned();
        let extension = extension_of(&name);
        Self {
            relative_path,
            file_name,
            name,
            extension,
            size,
            modified,
        }
    }

    /// Builds an entry from filesystem metadata.
    pub fn from_metadata(relative_path: PathBuf, metadata: &fs::Metadata) -> Self {
        let modified = metadata.modified().ok().map(DateTime::<Local>::from);
        Self::new(relative_path, metadata.len(), modified)
    }
}

/// One planned relocation. Both paths are relative to the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Subdirectory of the output root the file is routed into.
    pub group_key: String,
}

impl PlannedMove {
    /// Name of the file being moved.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// The full set of planned moves for one run, plus what went wrong.
///
/// `warnings` are produced while planning; `errors` are only filled in by the
/// executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Absolute, canonical scan root.
    pub root: PathBuf,
    pub rule: OrganizationRule,
    pub moves: Vec<PlannedMove>,
    pub warnings: Vec<PlanWarning>,
    pub errors: Vec<MoveFailure>,
}

impl ChangeSet {
    /// Creates an empty change set for a root and rule.
    pub fn new(root: PathBuf, rule: OrganizationRule) -> Self {
        Self {
            root,
            rule,
            moves: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Counts planned moves per group key, sorted by key.
    pub fn group_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for planned in &self.moves {
            *counts.entry(planned.group_key.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Like [`ChangeSet::group_counts`], but leaves out moves recorded in
    /// `errors` by the last apply.
    pub fn applied_group_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for planned in &self.moves {
            if self.errors.iter().any(|failure| failure.path == planned.source) {
                continue;
            }
            *counts.entry(planned.group_key.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Absolute source path of a planned move.
    pub fn absolute_source(&self, planned: &PlannedMove) -> PathBuf {
        self.root.join(&planned.source)
    }

    /// Absolute destination path of a planned move.
    pub fn absolute_destination(&self, planned: &PlannedMove) -> PathBuf {
        self.root.join(&planned.destination)
    }

    /// Returns true if `path` (relative to the root) is a planned destination.
    pub fn has_destination(&self, path: &Path) -> bool {
        self.moves.iter().any(|planned| planned.destination == path)
    }
}

/// Outcome of applying a change set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub moved_count: usize,
    pub errors: Vec<MoveFailure>,
}

impl ExecutionResult {
    pub fn status(&self) -> RunStatus {
        if self.errors.is_empty() {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithErrors(self.errors.len())
        }
    }

    /// Returns true if every planned move succeeded.
    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Summary status of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Every planned move succeeded.
    Completed,
    /// Some moves failed; the count is attached.
    CompletedWithErrors(usize),
}
