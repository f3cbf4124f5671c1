//! Applying a change set: moving files to their planned destinations.
//!
//! Moves run strictly in plan order. A file that cannot be moved is recorded
//! as a [`MoveFailure`] and the batch carries on with the next entry.

use crate::error::MoveFailure;
use crate::model::{ChangeSet, ExecutionResult, PlannedMove};
use std::fs;
use std::io;
use std::path::Path;

/// Executes change sets.
pub struct Executor;

impl Executor {
    /// Moves every file in `change_set` to its planned destination.
    ///
    /// Per-file failures are returned in the result and also stored in
    /// `change_set.errors`. The plan is consumed exactly as given; nothing is
    /// re-planned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortwise::executor::Executor;
    /// use sortwise::planner::build_plan;
    /// use sortwise::rule::RuleSelection;
    /// use std::path::Path;
    ///
    /// let mut plan = build_plan(Path::new("/path/to/dir"), &RuleSelection::parse("1"))?;
    /// let result = Executor::apply(&mut plan);
    /// println!("Moved {} files, {} errors", result.moved_count, result.errors.len());
    /// # Ok::<(), sortwise::error::OrganizeError>(())
    /// ```
    pub fn apply(change_set: &mut ChangeSet) -> ExecutionResult {
        Self::apply_with_progress(change_set, |_, _, _| {})
    }

    /// Same as [`Executor::apply`], calling `on_progress(done, total, planned)`
    /// after each entry is attempted.
    pub fn apply_with_progress<F>(
        change_set: &mut ChangeSet,
        mut on_progress: F,
    ) -> ExecutionResult
    where
        F: FnMut(usize, usize, &PlannedMove),
    {
        let total = change_set.moves.len();
        let mut result = ExecutionResult::default();

        for (index, planned) in change_set.moves.iter().enumerate() {
            match Self::move_planned(&change_set.root, planned) {
                Ok(()) => {
                    result.moved_count += 1;
                    tracing::debug!(
                        source = %planned.source.display(),
                        destination = %planned.destination.display(),
                        "moved"
                    );
                }
                Err(reason) => {
                    let failure = MoveFailure {
                        file_name: planned.file_name(),
                        path: planned.source.clone(),
                        reason,
                    };
                    tracing::error!(
                        path = %failure.path.display(),
                        reason = %failure.reason,
                        "move failed"
                    );
                    result.errors.push(failure);
                }
            }
            on_progress(index + 1, total, planned);
        }

        tracing::info!(
            moved = result.moved_count,
            failed = result.errors.len(),
            "change set applied"
        );
        change_set.errors = result.errors.clone();
        result
    }

    /// Moves one file, creating its destination directory on demand.
    ///
    /// Never overwrites: an occupied destination is an error.
    fn move_planned(root: &Path, planned: &PlannedMove) -> Result<(), String> {
        let source = root.join(&planned.source);
        let destination = root.join(&planned.destination);

        if fs::symlink_metadata(&source).is_err() {
            return Err("source file not found".to_string());
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("could not create {}: {}", parent.display(), e))?;
        }

        if fs::symlink_metadata(&destination).is_ok() {
            return Err(format!(
                "destination already exists: {}",
                planned.destination.display()
            ));
        }

        move_file(&source, &destination).map_err(|e| e.to_string())
    }
}

/// Renames `source` to `destination`, falling back to copy-verify-delete when
/// the two live on different filesystems. A symlink is recreated rather than
/// copied, so the link moves and its target is left alone.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            if fs::symlink_metadata(source)?.file_type().is_symlink() {
                tracing::debug!(source = %source.display(), "rename crosses devices, relinking");
                relink_then_remove(source, destination)
            } else {
                tracing::debug!(source = %source.display(), "rename crosses devices, copying");
                copy_then_remove(source, destination)
            }
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn relink_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let target = fs::read_link(source)?;
    std::os::unix::fs::symlink(&target, destination)?;
    fs::remove_file(source)
}

#[cfg(not(unix))]
fn relink_then_remove(source: &Path, _destination: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot move symlink {} across devices", source.display()),
    ))
}

fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let source_size = fs::metadata(source)?.len();
    fs::copy(source, destination)?;

    let destination_size = fs::metadata(destination)?.len();
    if destination_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(io::Error::other(format!(
            "copy verification failed: source {} bytes, destination {} bytes",
            source_size, destination_size
        )));
    }

    fs::remove_file(source)
}
