//! One-call entry points for hosts (CLI, GUI worker, scripts).
//!
//! A [`Session`] holds the plan between preview and apply so the caller
//! never needs process-wide state. Applying always consumes the exact plan
//! that was previewed.

use crate::config::CompiledFilters;
use crate::error::OrganizeResult;
use crate::executor::Executor;
use crate::model::{ChangeSet, ExecutionResult, PlannedMove};
use crate::planner::Planner;
use crate::report;
use crate::rule::RuleSelection;
use std::path::{Path, PathBuf};

/// Result of a dry run that planned at least one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub change_set: ChangeSet,
    /// Location of the written text report, if one was requested.
    pub report_path: Option<PathBuf>,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to move. No report is written and nothing is touched.
    NothingToDo(ChangeSet),
    /// Dry run: plan computed and optionally reported, filesystem untouched
    /// apart from the report.
    Previewed(Preview),
    /// Plan applied.
    Applied {
        change_set: ChangeSet,
        result: ExecutionResult,
    },
}

/// Knobs for [`run_with_options`]. The default is an apply run with the
/// report enabled, the same as `RunOptions::new(false)`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dry_run: bool,
    /// Write `Organized/dry_run_report.txt` on dry runs.
    pub write_report: bool,
    pub filters: CompiledFilters,
}

impl RunOptions {
    /// Options for a plain dry run or apply, with the report enabled and no
    /// filters.
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            write_report: true,
            filters: CompiledFilters::allow_all(),
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Plans and, unless `dry_run`, applies in one call.
///
/// Returns `Some(preview)` only for a dry run that planned at least one move.
/// The preview carries the path of the written report.
///
/// # Errors
///
/// [`OrganizeError::InvalidDirectory`](crate::error::OrganizeError::InvalidDirectory)
/// before anything is touched, or
/// [`OrganizeError::ReportWriteFailed`](crate::error::OrganizeError::ReportWriteFailed)
/// on a dry run.
///
/// # Examples
///
/// ```no_run
/// use sortwise::session::run;
/// use std::path::Path;
///
/// if let Some(preview) = run(Path::new("/home/user/Downloads"), "2", true)? {
///     println!("{} moves planned", preview.change_set.len());
/// }
/// # Ok::<(), sortwise::error::OrganizeError>(())
/// ```
pub fn run(directory: &Path, selector: &str, dry_run: bool) -> OrganizeResult<Option<Preview>> {
    match run_with_options(directory, selector, RunOptions::new(dry_run))? {
        RunOutcome::Previewed(preview) => Ok(Some(preview)),
        RunOutcome::NothingToDo(_) | RunOutcome::Applied { .. } => Ok(None),
    }
}

/// Like [`run`] but returns the full outcome.
pub fn run_with_options(
    directory: &Path,
    selector: &str,
    options: RunOptions,
) -> OrganizeResult<RunOutcome> {
    let mut session = Session::plan(directory, &RuleSelection::parse(selector), options.filters)?;

    if session.change_set().is_empty() {
        return Ok(RunOutcome::NothingToDo(session.into_change_set()));
    }

    if options.dry_run {
        let report_path = if options.write_report {
            Some(session.write_report()?)
        } else {
            None
        };
        return Ok(RunOutcome::Previewed(Preview {
            change_set: session.into_change_set(),
            report_path,
        }));
    }

    let result = session.apply();
    Ok(RunOutcome::Applied {
        change_set: session.into_change_set(),
        result,
    })
}

/// A planned run held between preview and apply.
#[derive(Debug)]
pub struct Session {
    change_set: ChangeSet,
    applied: Option<ExecutionResult>,
}

impl Session {
    /// Validates the directory and computes the plan.
    pub fn plan(
        directory: &Path,
        selection: &RuleSelection,
        filters: CompiledFilters,
    ) -> OrganizeResult<Self> {
        let planner = Planner::new(directory, filters)?;
        Ok(Self {
            change_set: planner.plan(selection),
            applied: None,
        })
    }

    pub fn change_set(&self) -> &ChangeSet {
        &self.change_set
    }

    /// Writes the text report for the held plan.
    pub fn write_report(&self) -> OrganizeResult<PathBuf> {
        report::write_report(&self.change_set)
    }

    /// Applies the held plan. A session applies at most once; later calls
    /// return the first result without touching the filesystem.
    pub fn apply(&mut self) -> ExecutionResult {
        self.apply_with_progress(|_, _, _| {})
    }

    /// [`Session::apply`] with a progress callback.
    pub fn apply_with_progress<F>(&mut self, on_progress: F) -> ExecutionResult
    where
        F: FnMut(usize, usize, &PlannedMove),
    {
        if let Some(result) = &self.applied {
            tracing::warn!("session already applied, ignoring");
            return result.clone();
        }
        let result = Executor::apply_with_progress(&mut self.change_set, on_progress);
        self.applied = Some(result.clone());
        result
    }

    pub fn is_applied(&self) -> bool {
        self.applied.is_some()
    }

    pub fn into_change_set(self) -> ChangeSet {
        self.change_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrganizeError;
    use crate::resolver::OUTPUT_DIR_NAME;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dry_run_returns_preview_with_report() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.jpg"), "a").unwrap();

        let preview = run(temp_dir.path(), "1", true)
            .expect("run should succeed")
            .expect("preview expected");

        assert_eq!(preview.change_set.len(), 1);
        let report_path = preview.report_path.expect("report path expected");
        assert!(report_path.exists());
        assert!(temp_dir.path().join("a.jpg").exists());
    }

    #[test]
    fn test_dry_run_with_nothing_to_move() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        assert_eq!(run(temp_dir.path(), "1", true).unwrap(), None);
        assert!(!temp_dir.path().join(OUTPUT_DIR_NAME).exists());
    }

    #[test]
    fn test_real_run_returns_none_and_moves() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("notes.txt"), "n").unwrap();

        assert_eq!(run(temp_dir.path(), "1", false).unwrap(), None);
        assert!(
            temp_dir
                .path()
                .join("Organized/Documents/notes.txt")
                .exists()
        );
    }

    #[test]
    fn test_invalid_directory_produces_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");

        let result = run(&missing, "1", true);

        assert!(matches!(
            result,
            Err(OrganizeError::InvalidDirectory { .. })
        ));
        assert!(!missing.exists());
    }

    #[test]
    fn test_default_options_write_report() {
        let options = RunOptions::default();
        assert!(!options.dry_run);
        assert!(options.write_report);

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.mp3"), "a").unwrap();
        let options = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };

        match run_with_options(temp_dir.path(), "1", options).unwrap() {
            RunOutcome::Previewed(preview) => {
                let report_path = preview.report_path.expect("report should be written");
                assert!(report_path.exists());
            }
            other => panic!("expected preview, got {:?}", other),
        }
    }

    #[test]
    fn test_dry_run_without_report() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.mp3"), "a").unwrap();

        let options = RunOptions {
            dry_run: true,
            write_report: false,
            filters: CompiledFilters::allow_all(),
        };
        let outcome = run_with_options(temp_dir.path(), "1", options).unwrap();

        match outcome {
            RunOutcome::Previewed(preview) => assert_eq!(preview.report_path, None),
            other => panic!("expected preview, got {:?}", other),
        }
        assert!(!temp_dir.path().join(OUTPUT_DIR_NAME).exists());
    }

    #[test]
    fn test_session_applies_previewed_plan_once() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.zip"), "a").unwrap();

        let mut session = Session::plan(
            temp_dir.path(),
            &RuleSelection::parse("1"),
            CompiledFilters::allow_all(),
        )
        .unwrap();
        let previewed = session.change_set().moves.clone();

        // Added after the preview; must not be picked up by apply.
        fs::write(temp_dir.path().join("late.zip"), "late").unwrap();

        let first = session.apply();
        let second = session.apply();

        assert_eq!(first.moved_count, 1);
        assert_eq!(first, second);
        assert!(session.is_applied());
        assert_eq!(session.change_set().moves, previewed);
        assert!(temp_dir.path().join("late.zip").exists());
    }
}
