//! Command orchestration for the `sortwise` binary.
//!
//! Loads configuration, plans, and then previews, applies, or previews and
//! asks before applying. A confirmed review applies the plan that was shown.

use crate::config::OrganizerConfig;
use crate::error::{OrganizeError, OrganizeResult};
use crate::model::{ChangeSet, ExecutionResult};
use crate::output::OutputFormatter;
use crate::report::{self, AppliedRun};
use crate::rule::{OrganizationRule, RuleSelection};
use crate::session::Session;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// How a command treats the computed plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Apply immediately.
    Apply,
    /// Preview only; writes the report and moves nothing.
    DryRun,
    /// Preview, then apply the same plan once confirmed.
    Review {
        /// Skip the confirmation prompt.
        assume_yes: bool,
    },
}

/// Output style on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text.
    #[default]
    Pretty,
    /// A single JSON document.
    Json,
}

/// A CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeCommand {
    /// Rule selector; falls back to the configured default, then file type.
    pub rule: Option<String>,
    pub mode: RunMode,
    pub format: OutputFormat,
}

impl OrganizeCommand {
    pub fn new(mode: RunMode) -> Self {
        Self {
            rule: None,
            mode,
            format: OutputFormat::Pretty,
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// JSON document printed for a preview.
#[derive(Debug, Serialize)]
struct PreviewDocument<'a> {
    plan: &'a ChangeSet,
    report_path: Option<&'a Path>,
}

/// Runs a command, asking on stdin before applying in review mode.
///
/// Returns the execution result when files were moved, `None` otherwise.
///
/// # Examples
///
/// ```no_run
/// use sortwise::cli::{run_cli, OrganizeCommand, RunMode};
/// use std::path::Path;
///
/// let command = OrganizeCommand::new(RunMode::DryRun).with_rule("date");
/// match run_cli(&command, Path::new("/path/to/directory")) {
///     Ok(_) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(
    command: &OrganizeCommand,
    dir_path: &Path,
) -> OrganizeResult<Option<ExecutionResult>> {
    run_cli_with_config(command, dir_path, None, &mut prompt_confirmation)
}

/// Runs a command with an optional configuration file and a confirmation
/// hook used by review mode.
///
/// # Errors
///
/// Configuration errors, an invalid directory, or a report that cannot be
/// written. Per-file move failures are reported in the result instead.
pub fn run_cli_with_config(
    command: &OrganizeCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
    confirm: &mut dyn FnMut(&ChangeSet) -> bool,
) -> OrganizeResult<Option<ExecutionResult>> {
    let config = OrganizerConfig::load(config_path)?;
    let filters = config.compile_filters()?;

    let selector = command
        .rule
        .as_deref()
        .or(config.organize.default_rule.as_deref())
        .unwrap_or_else(|| OrganizationRule::default().selector());
    let selection = RuleSelection::parse(selector);
    let pretty = command.format == OutputFormat::Pretty;

    if pretty {
        OutputFormatter::info(&format!(
            "Organizing contents of: {} ({})",
            dir_path.display(),
            selection.rule
        ));
    }

    let mut session = Session::plan(dir_path, &selection, filters)?;

    if pretty {
        OutputFormatter::plan_warnings(&session.change_set().warnings);
    }

    if session.change_set().is_empty() {
        if pretty {
            OutputFormatter::plain("No files found to organize.");
        } else {
            print_json(&PreviewDocument {
                plan: session.change_set(),
                report_path: None,
            })?;
        }
        return Ok(None);
    }

    match command.mode {
        RunMode::Apply => Ok(Some(apply(&mut session, command.format)?)),
        RunMode::DryRun => {
            let report_path = session.write_report()?;
            show_preview(session.change_set(), &report_path, command.format)?;
            if pretty {
                OutputFormatter::dry_run_notice("Dry run complete. No files were moved.");
            }
            Ok(None)
        }
        RunMode::Review { assume_yes } => {
            let report_path = session.write_report()?;
            show_preview(session.change_set(), &report_path, command.format)?;

            if !assume_yes && !confirm(session.change_set()) {
                if pretty {
                    OutputFormatter::info("Aborted. No files were moved.");
                }
                return Ok(None);
            }
            Ok(Some(apply(&mut session, command.format)?))
        }
    }
}

fn show_preview(
    change_set: &ChangeSet,
    report_path: &Path,
    format: OutputFormat,
) -> OrganizeResult<()> {
    match format {
        OutputFormat::Pretty => {
            OutputFormatter::plan(change_set);
            OutputFormatter::summary_table(&change_set.group_counts(), change_set.len());
            OutputFormatter::info(&format!("Report written to {}", report_path.display()));
            Ok(())
        }
        OutputFormat::Json => print_json(&PreviewDocument {
            plan: change_set,
            report_path: Some(report_path),
        }),
    }
}

fn apply(session: &mut Session, format: OutputFormat) -> OrganizeResult<ExecutionResult> {
    match format {
        OutputFormat::Pretty => {
            let pb = OutputFormatter::create_progress_bar(session.change_set().len() as u64);
            let result = session.apply_with_progress(|done, _, planned| {
                pb.set_position(done as u64);
                pb.set_message(planned.file_name());
            });
            pb.finish_and_clear();

            OutputFormatter::summary_table(
                &session.change_set().applied_group_counts(),
                result.moved_count,
            );
            OutputFormatter::run_summary(&result);
            Ok(result)
        }
        OutputFormat::Json => {
            let result = session.apply();
            print_json(&AppliedRun {
                plan: session.change_set(),
                result: &result,
            })?;
            Ok(result)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> OrganizeResult<()> {
    let json = report::to_json(value).map_err(|e| OrganizeError::ExportFailed {
        path: PathBuf::from("<stdout>"),
        reason: e.to_string(),
    })?;
    println!("{}", json);
    Ok(())
}

/// Asks on stderr and reads a yes/no answer from stdin. Anything but `y` or
/// `yes` declines.
pub fn prompt_confirmation(change_set: &ChangeSet) -> bool {
    eprint!("Move {} files now? [y/N] ", change_set.len());
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn never_called(_: &ChangeSet) -> bool {
        panic!("confirmation should not be requested");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_command_builder() {
        let command = OrganizeCommand::new(RunMode::DryRun)
            .with_rule("4")
            .with_format(OutputFormat::Json);
        assert_eq!(command.rule.as_deref(), Some("4"));
        assert_eq!(command.mode, RunMode::DryRun);
        assert_eq!(command.format, OutputFormat::Json);
    }

    #[test]
    fn test_dry_run_moves_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.pdf"), "a").unwrap();

        let result = run_cli_with_config(
            &OrganizeCommand::new(RunMode::DryRun),
            temp_dir.path(),
            None,
            &mut never_called,
        )
        .unwrap();

        assert_eq!(result, None);
        assert!(temp_dir.path().join("a.pdf").exists());
        assert!(temp_dir.path().join("Organized/dry_run_report.txt").exists());
    }

    #[test]
    fn test_review_declined_moves_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.pdf"), "a").unwrap();

        let mut asked = 0;
        let result = run_cli_with_config(
            &OrganizeCommand::new(RunMode::Review { assume_yes: false }),
            temp_dir.path(),
            None,
            &mut |_: &ChangeSet| {
                asked += 1;
                false
            },
        )
        .unwrap();

        assert_eq!(asked, 1);
        assert_eq!(result, None);
        assert!(temp_dir.path().join("a.pdf").exists());
    }

    #[test]
    fn test_review_with_assume_yes_applies() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.pdf"), "a").unwrap();

        let result = run_cli_with_config(
            &OrganizeCommand::new(RunMode::Review { assume_yes: true }),
            temp_dir.path(),
            None,
            &mut never_called,
        )
        .unwrap()
        .expect("files should have been moved");

        assert_eq!(result.moved_count, 1);
        assert!(temp_dir.path().join("Organized/Documents/a.pdf").exists());
    }

    #[test]
    fn test_configured_default_rule_is_used() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("a.pdf"), "a").unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[organize]\ndefault_rule = \"extension\"\n").unwrap();

        run_cli_with_config(
            &OrganizeCommand::new(RunMode::Apply),
            &target,
            Some(&config_path),
            &mut never_called,
        )
        .unwrap();

        assert!(target.join("Organized/pdf/a.pdf").exists());
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = run_cli_with_config(
            &OrganizeCommand::new(RunMode::Apply),
            temp_dir.path(),
            Some(&temp_dir.path().join("nope.toml")),
            &mut never_called,
        );
        assert!(matches!(result, Err(OrganizeError::Config(_))));
    }
}
