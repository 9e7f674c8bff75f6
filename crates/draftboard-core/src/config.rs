// Configuration loading and validation (config/draftboard.toml).

use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::Deserialize;
use thiserror::Error;

use crate::ranking::delta::DeltaLimits;

pub const CONFIG_FILE: &str = "draftboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Run configuration. Built once and handed to every report by reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub season: SeasonConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub offsets: OffsetConfig,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonConfig {
    #[serde(default = "current_year")]
    pub year: i32,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self { year: current_year() }
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub rankings: String,
    pub previous_rankings: String,
    pub start_ranking_list: String,
    pub batter_projections: String,
    pub pitcher_projections: String,
    pub reports_dir: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Consensus rows to read; 0 reads all.
    pub max_rows: usize,
    pub delta_window: u32,
    pub delta_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_rows: 0,
            delta_window: 250,
            delta_limit: 50,
        }
    }
}

impl ReportConfig {
    pub fn delta_limits(&self) -> DeltaLimits {
        DeltaLimits {
            window: self.delta_window,
            limit: self.delta_limit,
        }
    }
}

/// Baseline offsets handed to catchers and closers when offsets are reset.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OffsetConfig {
    pub catcher_baseline: i32,
    pub closer_baseline: i32,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            catcher_baseline: 12,
            closer_baseline: 24,
        }
    }
}

impl Config {
    /// Resolve a configured path against the config's base directory.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        self.base_dir.join(configured)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.resolve(&self.paths.reports_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.paths.database)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse config text without touching the filesystem. `base_dir` is recorded
/// for later path resolution.
pub fn parse_config(text: &str, source: &Path, base_dir: &Path) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: source.to_path_buf(),
        source: e,
    })?;
    config.base_dir = base_dir.to_path_buf();
    validate(&config)?;
    Ok(config)
}

/// Load and validate `config/draftboard.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    parse_config(&text, &path, base_dir)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", path.display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let year = config.season.year;
    if !(1900..=2200).contains(&year) {
        return Err(ConfigError::ValidationError {
            field: "season.year".into(),
            message: format!("must be between 1900 and 2200, got {year}"),
        });
    }

    if config.report.delta_window == 0 {
        return Err(ConfigError::ValidationError {
            field: "report.delta_window".into(),
            message: "must be greater than 0".into(),
        });
    }
    if config.report.delta_limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "report.delta_limit".into(),
            message: "must be greater than 0".into(),
        });
    }

    let p = &config.paths;
    let path_fields: &[(&str, &str)] = &[
        ("paths.rankings", p.rankings.as_str()),
        ("paths.previous_rankings", p.previous_rankings.as_str()),
        ("paths.start_ranking_list", p.start_ranking_list.as_str()),
        ("paths.batter_projections", p.batter_projections.as_str()),
        ("paths.pitcher_projections", p.pitcher_projections.as_str()),
        ("paths.reports_dir", p.reports_dir.as_str()),
        ("paths.database", p.database.as_str()),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
