//! Error types for planning and applying an organization run.
//!
//! Fatal errors ([`OrganizeError`]) abort a run before the filesystem is
//! touched. Per-file failures ([`MoveFailure`]) and planning notices
//! ([`PlanWarning`]) are collected and reported together instead.

use crate::config::ConfigError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The root directory does not exist or is not a directory.
    #[error("Invalid directory {}: {reason}", .path.display())]
    InvalidDirectory { path: PathBuf, reason: String },

    /// Configuration could not be loaded or compiled.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The preview report could not be written.
    #[error("Failed to write report {}: {source}", .path.display())]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A plan or result could not be exported.
    #[error("Failed to export {}: {reason}", .path.display())]
    ExportFailed { path: PathBuf, reason: String },
}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A single file that could not be moved.
///
/// Collected by the executor; never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Error moving {file_name}: {reason}")]
pub struct MoveFailure {
    /// Name of the file that failed to move.
    pub file_name: String,
    /// Source path relative to the scan root.
    pub path: PathBuf,
    /// Human-readable cause.
    pub reason: String,
}

/// Non-fatal notices raised while building a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// The rule selector was not understood; files are grouped by type instead.
    #[error("Unrecognized rule '{selector}', defaulting to file type organization")]
    UnrecognizedRule { selector: String },

    /// An entry could not be read during the walk and was skipped.
    #[error("Skipped {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}
