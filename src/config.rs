//! Configuration loading and file filtering.
//!
//! Configuration is optional. Without a file every regular file under the
//! root is organized with the rule given on the command line.
//!
//! A `.sortwiserc.toml` that groups by date and leaves partial downloads
//! and build output alone:
//!
//! ```toml
//! [organize]
//! default_rule = "2"
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["desktop.ini"]
//! patterns = ["target/**", "*.swp"]
//! extensions = ["part", "crdownload"]
//! regex = ["^~\\$"]
//!
//! [filters.include]
//! patterns = ["target/release/*.zip"]
//! ```
//!
//! Glob patterns are matched against the path relative to the scan root;
//! regexes against the bare file name.

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".sortwiserc.toml";

/// Errors that can occur during configuration loading and filter compilation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// An explicit `--config` path that does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// The file is not TOML or does not match the schema.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// A `patterns` entry is not a valid glob.
    #[error("Invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),
    /// A `regex` entry does not compile.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// The file exists but could not be read.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub organize: OrganizeSettings,
    #[serde(default)]
    pub filters: FilterRules,
}

/// Defaults for an organization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizeSettings {
    /// Rule selector used when none is given on the command line.
    #[serde(default)]
    pub default_rule: Option<String>,
}

/// Filter rules applied to every file found under the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to organize hidden files (starting with "."). Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Matches here are organized even if an exclude rule also matches.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Files matching any of these stay where they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Bare file names, compared exactly.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Globs over the path relative to the root, e.g. `cache/**`.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot; case is ignored.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regexes over the bare file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Allow-list that wins over [`ExcludeRules`] and the hidden-file switch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Globs over the path relative to the root.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl OrganizerConfig {
    /// Finds and parses the configuration for a run.
    ///
    /// The first hit wins: `config_path`, then `./.sortwiserc.toml`, then
    /// `~/.config/sortwise/config.toml`. With none of them present the
    /// built-in defaults apply and every file is organized.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ConfigNotFound`] when `config_path` is given but
    /// missing; a parse error when the chosen file is not a valid document.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sortwise")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the matchers the planner consults for each file.
    ///
    /// # Errors
    ///
    /// The first glob or regex in `[filters]` that fails to compile.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled filter structures.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    /// Compiles every glob and regex up front.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidGlobPattern`] or [`ConfigError::InvalidRegexPattern`].
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Filters that admit every file.
    pub fn allow_all() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }

    /// Decides whether the file at `relative_path` (relative to the scan
    /// root) takes part in the plan.
    ///
    /// An include glob admits the file outright. Otherwise the first matching
    /// exclusion rejects it: a hidden name when hidden files are off, then
    /// file name, extension, path glob and file-name regex.
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_any(&self.include_patterns, relative_path) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.matches_any(&self.exclude_patterns, relative_path) {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }

    fn matches_any(&self, patterns: &[Pattern], path: &Path) -> bool {
        patterns.iter().any(|pattern| pattern.matches_path(path))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self::allow_all()
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rules_with(exclude: ExcludeRules) -> FilterRules {
        FilterRules {
            enable_hidden_files: true,
            exclude,
            include: IncludeRules::default(),
        }
    }

    #[test]
    fn test_default_config_includes_hidden_files() {
        let config = OrganizerConfig::default();
        assert!(config.filters.enable_hidden_files);
        assert!(config.organize.default_rule.is_none());

        let compiled = config.compile_filters().unwrap();
        assert!(compiled.should_include(Path::new(".DS_Store")));
    }

    #[test]
    fn test_hidden_file_excluded_when_disabled() {
        let rules = FilterRules {
            enable_hidden_files: false,
            ..Default::default()
        };
        let compiled = CompiledFilters::new(&rules).unwrap();

        assert!(!compiled.should_include(Path::new(".gitignore")));
        assert!(compiled.should_include(Path::new("visible.txt")));
    }

    #[test]
    fn test_parse_full_document() {
        let config = OrganizerConfig::from_toml(
            r#"
            [organize]
            default_rule = "3"

            [filters]
            enable_hidden_files = false

            [filters.exclude]
            filenames = ["Thumbs.db"]
            extensions = [".PART"]
            "#,
        )
        .unwrap();

        assert_eq!(config.organize.default_rule.as_deref(), Some("3"));
        assert!(!config.filters.enable_hidden_files);

        let compiled = config.compile_filters().unwrap();
        assert!(!compiled.should_include(Path::new("Thumbs.db")));
        assert!(!compiled.should_include(Path::new("movie.mkv.part")));
        assert!(compiled.should_include(Path::new("movie.mkv")));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = OrganizerConfig::from_toml("").unwrap();
        assert!(config.filters.enable_hidden_files);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = OrganizerConfig::from_toml("[filters\nbroken");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = OrganizerConfig::load(Some(Path::new("/no/such/sortwise.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[organize]\ndefault_rule = \"date\"\n").expect("Failed to write config");

        let config = OrganizerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.organize.default_rule.as_deref(), Some("date"));
    }

    #[test]
    fn test_exclude_extensions_case_insensitive() {
        let compiled = CompiledFilters::new(&rules_with(ExcludeRules {
            extensions: vec!["bak".to_string(), "tmp".to_string()],
            ..Default::default()
        }))
        .unwrap();

        assert!(!compiled.should_include(Path::new("file.bak")));
        assert!(!compiled.should_include(Path::new("file.BAK")));
        assert!(compiled.should_include(Path::new("file.txt")));
    }

    #[test]
    fn test_exclude_glob_matches_relative_path() {
        let compiled = CompiledFilters::new(&rules_with(ExcludeRules {
            patterns: vec!["**/node_modules/**".to_string(), "*.cache".to_string()],
            ..Default::default()
        }))
        .unwrap();

        assert!(!compiled.should_include(Path::new("web/node_modules/pkg/index.js")));
        assert!(!compiled.should_include(Path::new("file.cache")));
        assert!(compiled.should_include(Path::new("my_node_modules/index.js")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let rules = FilterRules {
            enable_hidden_files: false,
            exclude: ExcludeRules::default(),
            include: IncludeRules {
                patterns: vec![".important".to_string()],
            },
        };
        let compiled = CompiledFilters::new(&rules).unwrap();

        assert!(compiled.should_include(Path::new(".important")));
        assert!(!compiled.should_include(Path::new(".other")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = CompiledFilters::new(&rules_with(ExcludeRules {
            regex: vec![r"^~\$.*".to_string()],
            ..Default::default()
        }))
        .unwrap();

        assert!(!compiled.should_include(Path::new("~$budget.xlsx")));
        assert!(compiled.should_include(Path::new("budget.xlsx")));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let bad_regex = CompiledFilters::new(&rules_with(ExcludeRules {
            regex: vec!["[invalid(".to_string()],
            ..Default::default()
        }));
        assert!(matches!(
            bad_regex,
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let bad_glob = CompiledFilters::new(&rules_with(ExcludeRules {
            patterns: vec!["[invalid".to_string()],
            ..Default::default()
        }));
        assert!(matches!(bad_glob, Err(ConfigError::InvalidGlobPattern(_))));
    }
}
