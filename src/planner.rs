//! Plan builder: walks the root and turns every file into a planned move.
//!
//! Planning only reads the filesystem. The output root (`<root>/Organized`)
//! is never descended into and nothing that resolves inside it is planned.

use crate::config::CompiledFilters;
use crate::error::{OrganizeError, OrganizeResult, PlanWarning};
use crate::file_category::FileMapper;
use crate::model::{ChangeSet, FileEntry, PlannedMove};
use crate::resolver::{DestinationResolver, OUTPUT_DIR_NAME};
use crate::rule::RuleSelection;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Builds change sets for one root directory.
#[derive(Debug, Clone)]
pub struct Planner {
    root: PathBuf,
    output_root: PathBuf,
    filters: CompiledFilters,
    mapper: FileMapper,
}

impl Planner {
    /// Validates `root` and prepares a planner for it.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidDirectory`] if `root` does not exist,
    /// is not a directory, or already holds an `Organized` entry that is not
    /// a directory.
    pub fn new(root: &Path, filters: CompiledFilters) -> OrganizeResult<Self> {
        let invalid = |reason: String| OrganizeError::InvalidDirectory {
            path: root.to_path_buf(),
            reason,
        };

        let metadata = fs::metadata(root).map_err(|e| invalid(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(invalid("not a directory".to_string()));
        }
        let root = fs::canonicalize(root).map_err(|e| invalid(e.to_string()))?;
        let output_root = root.join(OUTPUT_DIR_NAME);

        if fs::symlink_metadata(&output_root).is_ok()
            && !fs::metadata(&output_root).is_ok_and(|m| m.is_dir())
        {
            return Err(OrganizeError::InvalidDirectory {
                path: output_root,
                reason: format!("{} exists and is not a directory", OUTPUT_DIR_NAME),
            });
        }

        Ok(Self {
            root,
            output_root,
            filters,
            mapper: FileMapper::default(),
        })
    }

    /// Canonical scan root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the output directory.
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Builds a change set. Never mutates the filesystem.
    ///
    /// Two calls over an unchanged tree return equal change sets.
    pub fn plan(&self, selection: &RuleSelection) -> ChangeSet {
        let mut change_set = ChangeSet::new(self.root.clone(), selection.rule);
        change_set.warnings.extend(selection.warning.clone());

        let entries = self.scan(&mut change_set.warnings);
        let mut resolver = DestinationResolver::new(&self.root);

        for entry in entries {
            let group_key = selection.rule.group_key(&entry, &self.mapper);
            let destination = resolver.resolve(&group_key, &entry.file_name);
            tracing::debug!(
                source = %entry.relative_path.display(),
                destination = %destination.display(),
                "planned move"
            );
            change_set.moves.push(PlannedMove {
                source: entry.relative_path,
                destination,
                group_key,
            });
        }

        tracing::info!(
            root = %self.root.display(),
            rule = ?selection.rule,
            moves = change_set.moves.len(),
            "plan built"
        );
        change_set
    }

    /// Enumerates candidate files in a stable order.
    pub fn scan(&self, warnings: &mut Vec<PlanWarning>) -> Vec<FileEntry> {
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.path() != self.output_root.as_path());

        let mut entries = Vec::new();
        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(self.root.as_path());
                    let path = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    warnings.push(PlanWarning::Unreadable {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if file_type.is_symlink() && !self.is_plannable_link(path) {
                tracing::debug!(path = %path.display(), "skipping symlink");
                continue;
            }
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }
            if self.is_inside_output(path) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            if !self.filters.should_include(relative) {
                tracing::debug!(path = %relative.display(), "excluded by filters");
                continue;
            }

            match fs::metadata(path) {
                Ok(metadata) => {
                    entries.push(FileEntry::from_metadata(relative.to_path_buf(), &metadata))
                }
                Err(e) => {
                    tracing::warn!(path = %relative.display(), error = %e, "cannot read metadata");
                    warnings.push(PlanWarning::Unreadable {
                        path: relative.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        entries
    }

    fn is_inside_output(&self, path: &Path) -> bool {
        path.starts_with(&self.output_root)
    }

    /// A symlink is planned only if it resolves to a regular file outside the
    /// output root. The link itself is what gets moved.
    fn is_plannable_link(&self, path: &Path) -> bool {
        match fs::canonicalize(path) {
            Ok(target) => target.is_file() && !self.is_inside_output(&target),
            Err(_) => false,
        }
    }
}

/// Plans a run over `root` with every file admitted.
///
/// # Examples
///
/// ```no_run
/// use sortwise::planner::build_plan;
/// use sortwise::rule::RuleSelection;
/// use std::path::Path;
///
/// let plan = build_plan(Path::new("/home/user/Downloads"), &RuleSelection::parse("1"))?;
/// for planned in &plan.moves {
///     println!("{} -> {}", planned.source.display(), planned.destination.display());
/// }
/// # Ok::<(), sortwise::error::OrganizeError>(())
/// ```
pub fn build_plan(root: &Path, selection: &RuleSelection) -> OrganizeResult<ChangeSet> {
    Ok(Planner::new(root, CompiledFilters::allow_all())?.plan(selection))
}
