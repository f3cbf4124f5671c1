//! Preview documents for a change set.
//!
//! The text report is what a dry run drops into the output directory. It is
//! paginated with form feeds so it prints cleanly, [`LINES_PER_PAGE`] moves to
//! a page. The JSON export serialises the full [`ChangeSet`].

use crate::error::{OrganizeError, OrganizeResult};
use crate::model::{ChangeSet, ExecutionResult};
use crate::resolver::OUTPUT_DIR_NAME;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the dry-run report inside the output directory.
pub const REPORT_FILE_NAME: &str = "dry_run_report.txt";

/// Planned moves listed per page.
pub const LINES_PER_PAGE: usize = 50;

const REPORT_TITLE: &str = "Dry Run Report - File Organizer";
const PAGE_BREAK: char = '\x0c';

/// Location of the report for a given scan root.
pub fn report_path(root: &Path) -> PathBuf {
    root.join(OUTPUT_DIR_NAME).join(REPORT_FILE_NAME)
}

/// Renders the text report.
///
/// The header appears once, on the first page. Every page ends with a
/// `Page N of M` footer and pages are separated by a form feed.
pub fn render(change_set: &ChangeSet, generated_at: DateTime<Local>) -> String {
    let lines: Vec<String> = change_set
        .moves
        .iter()
        .map(|planned| {
            format!(
                "{} → {}",
                planned.source.display(),
                planned.destination.display()
            )
        })
        .collect();

    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![lines.as_slice()]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };
    let page_count = pages.len();

    let mut out = String::new();
    for (index, page) in pages.iter().enumerate() {
        if index == 0 {
            out.push_str(REPORT_TITLE);
            out.push('\n');
            out.push_str(&format!(
                "Generated on: {}\n",
                generated_at.format("%Y-%m-%d %H:%M:%S")
            ));
            out.push_str("The following file movements will occur:\n\n");
        } else {
            out.push(PAGE_BREAK);
            out.push('\n');
        }

        for line in page.iter() {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("\nPage {} of {}\n", index + 1, page_count));
    }
    out
}

/// Writes the text report to `<root>/Organized/dry_run_report.txt`,
/// replacing any earlier one, and returns its path.
///
/// # Errors
///
/// Returns [`OrganizeError::ReportWriteFailed`] if the output directory or
/// the file cannot be written.
pub fn write_report(change_set: &ChangeSet) -> OrganizeResult<PathBuf> {
    let path = report_path(&change_set.root);
    let write_failed = |source: std::io::Error| OrganizeError::ReportWriteFailed {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(&path, render(change_set, Local::now())).map_err(write_failed)?;

    tracing::info!(path = %path.display(), moves = change_set.len(), "report written");
    Ok(path)
}

/// JSON document for an applied run.
#[derive(Debug, Serialize)]
pub struct AppliedRun<'a> {
    pub plan: &'a ChangeSet,
    pub result: &'a ExecutionResult,
}

/// Serialises any report value as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Writes `change_set` as pretty JSON to `path`.
///
/// # Errors
///
/// Returns [`OrganizeError::ExportFailed`] if serialisation or the write fails.
pub fn write_json(change_set: &ChangeSet, path: &Path) -> OrganizeResult<()> {
    let export_failed = |reason: String| OrganizeError::ExportFailed {
        path: path.to_path_buf(),
        reason,
    };

    let json = to_json(change_set).map_err(|e| export_failed(e.to_string()))?;
    fs::write(path, json).map_err(|e| export_failed(e.to_string()))?;
    Ok(())
}
