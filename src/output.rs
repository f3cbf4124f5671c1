//! Terminal output for the binary.
//!
//! Every user-facing line goes through [`OutputFormatter`] so styling stays in
//! one place. Diagnostics go through `tracing` instead and end up on stderr.

use crate::error::{MoveFailure, OrganizeError, PlanWarning};
use crate::model::{ChangeSet, ExecutionResult, RunStatus};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Styled printing of plans, progress and run summaries.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Green checkmark line on stdout.
    ///
    /// ```no_run
    /// use sortwise::output::OutputFormatter;
    /// OutputFormatter::success("Organization fully succeeded");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for the apply phase.
    ///
    /// ```no_run
    /// use sortwise::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(12);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb
    }

    /// Prints every planned move as `source → destination`.
    pub fn plan(change_set: &ChangeSet) {
        Self::header(&format!(
            "Planned moves in {} ({})",
            change_set.root.display(),
            change_set.rule
        ));
        for planned in &change_set.moves {
            println!(
                "  {} {} {}",
                planned.source.display(),
                "→".dimmed(),
                planned.destination.display().to_string().green()
            );
        }
    }

    pub fn plan_warnings(warnings: &[PlanWarning]) {
        for warning in warnings {
            Self::warning(&warning.to_string());
        }
    }

    /// Prints a table of planned or moved files per group.
    ///
    /// ```no_run
    /// use sortwise::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("2024-03-07".to_string(), 4);
    /// counts.insert("2024-03-09".to_string(), 2);
    /// OutputFormatter::summary_table(&counts, 6);
    /// ```
    pub fn summary_table(group_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = group_counts
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max("Folder".len());

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));
        for (group, count) in group_counts {
            println!(
                "{:<width$} | {} {}",
                group,
                count.to_string().green(),
                files_word(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            files_word(total_files),
            width = width
        );
    }

    /// Prints the final status line, listing every failure when there are
    /// any.
    pub fn run_summary(result: &ExecutionResult) {
        match result.status() {
            RunStatus::Completed => Self::success(&format!(
                "Organization fully succeeded: {} {} moved",
                result.moved_count,
                files_word(result.moved_count)
            )),
            RunStatus::CompletedWithErrors(count) => {
                Self::warning(&format!(
                    "Organization succeeded with {} {}: {} {} moved",
                    count,
                    if count == 1 { "error" } else { "errors" },
                    result.moved_count,
                    files_word(result.moved_count)
                ));
                Self::failures(&result.errors);
            }
        }
    }

    pub fn failures(errors: &[MoveFailure]) {
        for failure in errors {
            Self::error(&failure.to_string());
        }
    }

    /// Prints a fatal error. Invalid directories get the aborted wording.
    pub fn fatal(error: &OrganizeError) {
        match error {
            OrganizeError::InvalidDirectory { .. } => {
                Self::error(&format!("Organization aborted, directory invalid: {}", error))
            }
            _ => Self::error(&error.to_string()),
        }
    }
}

fn files_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_word() {
        assert_eq!(files_word(0), "files");
        assert_eq!(files_word(1), "file");
        assert_eq!(files_word(2), "files");
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = OutputFormatter::create_progress_bar(7);
        assert_eq!(pb.length(), Some(7));
        pb.finish_and_clear();
    }
}
