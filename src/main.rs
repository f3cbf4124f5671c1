use clap::Parser;
use sortwise::cli::{
    OrganizeCommand, OutputFormat, RunMode, prompt_confirmation, run_cli_with_config,
};
use sortwise::output::OutputFormatter;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sort the files in a directory into organized folders")]
struct Args {
    /// Directory to organize
    #[arg(value_hint = clap::ValueHint::DirPath)]
    directory: PathBuf,

    /// Rule: 1/type, 2/date, 3/size, 4/extension
    #[arg(short, long)]
    rule: Option<String>,

    /// Only show what would be moved and write a report
    #[arg(short = 'n', long, conflicts_with = "review")]
    dry_run: bool,

    /// Show the plan, then ask before moving anything
    #[arg(long)]
    review: bool,

    /// Answer yes to the review prompt
    #[arg(short, long, requires = "review")]
    yes: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Configuration file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn command(&self) -> OrganizeCommand {
        let mode = if self.dry_run {
            RunMode::DryRun
        } else if self.review {
            RunMode::Review {
                assume_yes: self.yes,
            }
        } else {
            RunMode::Apply
        };
        OrganizeCommand {
            rule: self.rule.clone(),
            mode,
            format: self.format,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run_cli_with_config(
        &args.command(),
        &args.directory,
        args.config.as_deref(),
        &mut prompt_confirmation,
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::fatal(&e);
            ExitCode::FAILURE
        }
    }
}
