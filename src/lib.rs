//! sortwise - sort the files under a directory into organized folders
//!
//! Organizing is two phases. [`planner::Planner`] walks the tree and builds a
//! [`ChangeSet`] without touching the filesystem; [`executor::Executor`] then
//! replays that exact change set. A dry run stops after the first phase and
//! writes a preview report instead.
//!
//! Files are routed to `<root>/Organized/<group>/<name>`, where the group
//! comes from the chosen [`OrganizationRule`]. Destinations never collide:
//! taken names get a `_1`, `_2`, ... suffix.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod file_category;
pub mod model;
pub mod output;
pub mod planner;
pub mod report;
pub mod resolver;
pub mod rule;
pub mod session;

pub use config::{CompiledFilters, ConfigError, OrganizerConfig};
pub use error::{MoveFailure, OrganizeError, OrganizeResult, PlanWarning};
pub use executor::Executor;
pub use file_category::{Category, FileMapper};
pub use model::{ChangeSet, ExecutionResult, FileEntry, PlannedMove, RunStatus};
pub use planner::{Planner, build_plan};
pub use rule::{OrganizationRule, RuleSelection};
pub use session::{Preview, RunOptions, RunOutcome, Session, run, run_with_options};

pub use cli::{OrganizeCommand, run_cli};
