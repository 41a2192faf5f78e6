//! Configuration file loading with precedence handling.

use crate::feed::DEFAULT_PAGE_LIMIT;
use crate::fetch::PREFETCH_SCREENS;
use crate::image::DEFAULT_IMAGE_WORKERS;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "REVIEWFEED_CONFIG";

/// Environment variable overriding the page size.
pub const PAGE_LIMIT_ENV_VAR: &str = "REVIEWFEED_PAGE_LIMIT";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/reviewfeed/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Reviews per page.
    #[serde(default)]
    pub page_limit: Option<usize>,

    /// Viewport heights of unseen content that trigger the next page.
    #[serde(default)]
    pub prefetch_screens: Option<f64>,

    /// Image worker threads.
    #[serde(default)]
    pub image_workers: Option<usize>,

    /// Width rows are measured at.
    #[serde(default)]
    pub viewport_width: Option<f64>,

    /// Height of the simulated viewport.
    #[serde(default)]
    pub viewport_height: Option<f64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Reviews per page; always positive.
    pub page_limit: usize,
    /// Prefetch distance in viewport heights.
    pub prefetch_screens: f64,
    /// Image worker threads.
    pub image_workers: usize,
    /// Measurement width.
    pub viewport_width: f64,
    /// Simulated viewport height.
    pub viewport_height: f64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            prefetch_screens: PREFETCH_SCREENS,
            image_workers: DEFAULT_IMAGE_WORKERS,
            viewport_width: 375.0,
            viewport_height: 812.0,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/reviewfeed/reviewfeed.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("reviewfeed").join("reviewfeed.log")
    } else {
        PathBuf::from("reviewfeed.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/reviewfeed/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reviewfeed").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `REVIEWFEED_CONFIG` environment variable
/// 3. Default path `~/.config/reviewfeed/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `REVIEWFEED_PAGE_LIMIT`. Values that are not a positive integer are
/// ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(limit) = std::env::var(PAGE_LIMIT_ENV_VAR)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|limit| *limit > 0)
    {
        config.page_limit = limit;
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use
/// default. A `page_limit` of zero falls back to the default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        page_limit: config
            .page_limit
            .filter(|limit| *limit > 0)
            .unwrap_or(defaults.page_limit),
        prefetch_screens: config.prefetch_screens.unwrap_or(defaults.prefetch_screens),
        image_workers: config.image_workers.unwrap_or(defaults.image_workers),
        viewport_width: config.viewport_width.unwrap_or(defaults.viewport_width),
        viewport_height: config.viewport_height.unwrap_or(defaults.viewport_height),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    limit_override: Option<usize>,
    width_override: Option<f64>,
    height_override: Option<f64>,
) -> ResolvedConfig {
    if let Some(limit) = limit_override.filter(|limit| *limit > 0) {
        config.page_limit = limit;
    }

    if let Some(width) = width_override {
        config.viewport_width = width;
    }

    if let Some(height) = height_override {
        config.viewport_height = height;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
