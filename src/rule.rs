//! Organization rules.
//!
//! A rule turns a [`FileEntry`] into a grouping key: the name of the
//! subdirectory under the output root the file is routed into.
//!
//! | Selector | Rule | Example key |
//! |---|---|---|
//! | `1`, `type` | [`OrganizationRule::ByFileType`] | `Images` |
//! | `2`, `date` | [`OrganizationRule::ByModifiedDate`] | `2024-03-07` |
//! | `3`, `size` | [`OrganizationRule::BySizeBucket`] | `Small` |
//! | `4`, `extension` | [`OrganizationRule::ByExtension`] | `pdf` |
//!
//! Dates are rendered in the local timezone of the machine running the plan,
//! not UTC.

use crate::error::PlanWarning;
use crate::file_category::FileMapper;
use crate::model::FileEntry;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Files strictly smaller than this many bytes are "Small".
pub const SMALL_FILE_LIMIT: u64 = 1_000_000;

/// Files strictly smaller than this many bytes (and not Small) are "Medium";
/// anything at or above it is "Large".
pub const MEDIUM_FILE_LIMIT: u64 = 100_000_000;

/// Key used by [`OrganizationRule::ByExtension`] for files without one.
pub const NO_EXTENSION_KEY: &str = "NoExtension";

/// Key used by [`OrganizationRule::ByModifiedDate`] when no timestamp is available.
pub const UNKNOWN_DATE_KEY: &str = "UnknownDate";

/// The fixed set of rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationRule {
    /// Category from the extension table ("Images", "Documents", ...).
    #[default]
    ByFileType,
    /// Local modification date as `YYYY-MM-DD`.
    ByModifiedDate,
    /// "Small", "Medium" or "Large".
    BySizeBucket,
    /// Lowercased extension, or "NoExtension".
    ByExtension,
}

impl OrganizationRule {
    pub const ALL: [OrganizationRule; 4] = [
        OrganizationRule::ByFileType,
        OrganizationRule::ByModifiedDate,
        OrganizationRule::BySizeBucket,
        OrganizationRule::ByExtension,
    ];

    /// Numeric menu selector for this rule.
    pub fn selector(&self) -> &'static str {
        match self {
            OrganizationRule::ByFileType => "1",
            OrganizationRule::ByModifiedDate => "2",
            OrganizationRule::BySizeBucket => "3",
            OrganizationRule::ByExtension => "4",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            OrganizationRule::ByFileType => "By File Type",
            OrganizationRule::ByModifiedDate => "By Modified Date (Year-Month-Day)",
            OrganizationRule::BySizeBucket => "By File Size (Small/Medium/Large)",
            OrganizationRule::ByExtension => "By Extension",
        }
    }

    /// Computes the grouping key for a file.
    pub fn group_key(&self, entry: &FileEntry, mapper: &FileMapper) -> String {
        match self {
            OrganizationRule::ByFileType => mapper
                .categorize(entry.extension.as_deref())
                .dir_name()
                .to_string(),
            OrganizationRule::ByModifiedDate => match entry.modified {
                Some(modified) => modified.format("%Y-%m-%d").to_string(),
                None => UNKNOWN_DATE_KEY.to_string(),
            },
            OrganizationRule::BySizeBucket => size_bucket(entry.size).to_string(),
            OrganizationRule::ByExtension => entry
                .extension
                .clone()
                .unwrap_or_else(|| NO_EXTENSION_KEY.to_string()),
        }
    }
}

impl std::fmt::Display for OrganizationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Error returned when a selector names no rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized rule selector '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for OrganizationRule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "type" | "file-type" | "filetype" => Ok(OrganizationRule::ByFileType),
            "2" | "date" | "modified" | "modified-date" => Ok(OrganizationRule::ByModifiedDate),
            "3" | "size" => Ok(OrganizationRule::BySizeBucket),
            "4" | "ext" | "extension" => Ok(OrganizationRule::ByExtension),
            _ => Err(UnknownRule(s.to_string())),
        }
    }
}

/// A rule resolved from user input, with the notice raised if it fell back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSelection {
    pub rule: OrganizationRule,
    pub warning: Option<PlanWarning>,
}

impl RuleSelection {
    /// Resolves a selector. Unknown selectors fall back to
    /// [`OrganizationRule::ByFileType`] and carry an
    /// [`PlanWarning::UnrecognizedRule`] notice.
    pub fn parse(selector: &str) -> Self {
        match selector.parse::<OrganizationRule>() {
            Ok(rule) => Self {
                rule,
                warning: None,
            },
            Err(UnknownRule(selector)) => {
                tracing::warn!(%selector, "unrecognized rule selector, using file type");
                Self {
                    rule: OrganizationRule::ByFileType,
                    warning: Some(PlanWarning::UnrecognizedRule { selector }),
                }
            }
        }
    }
}

impl From<OrganizationRule> for RuleSelection {
    fn from(rule: OrganizationRule) -> Self {
        Self {
            rule,
            warning: None,
        }
    }
}

fn size_bucket(size: u64) -> &'static str {
    if size < SMALL_FILE_LIMIT {
        "Small"
    } else if size < MEDIUM_FILE_LIMIT {
        "Medium"
    } else {
        "Large"
    }
}
