//! Configuration file loading for proppatch.
//!
//! Discovers and loads `proppatch.toml` from the target file's directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use proppatch_rules::DEFAULT_PROP;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "proppatch.toml";

/// Top-level configuration from proppatch.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProppatchConfig {
    /// Policy settings (prop name, match enforcement).
    pub policy: PolicyConfig,

    /// Backup settings.
    pub backups: BackupsConfig,
}

/// Policy section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Prop name to inject. Falls back to the builtin default when unset.
    pub prop: Option<String>,

    /// Fail when any injection rule matches zero times.
    pub require_matches: bool,
}

/// Backups section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Whether to write a backup before overwriting the target.
    pub enabled: bool,

    /// Suffix for backup files.
    pub suffix: String,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            suffix: ".proppatch.bak".to_string(),
        }
    }
}

/// Discover the proppatch.toml config file.
///
/// Searches for `proppatch.toml` in the given directory.
/// Returns `None` if no config file is found.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a proppatch.toml config file.
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ProppatchConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ProppatchConfig> {
    let config: ProppatchConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from a directory, or return default if not found.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<ProppatchConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(ProppatchConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
///
/// CLI arguments take precedence over config file settings.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    /// Prop name to inject.
    pub prop: String,

    /// Whether zero-match rules abort the run.
    pub require_matches: bool,

    /// Whether to back up the target before writing.
    pub backup_enabled: bool,

    /// Suffix for backup files.
    pub backup_suffix: String,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ProppatchConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: ProppatchConfig) -> Self {
        Self { config }
    }

    /// Merge with apply command CLI arguments.
    ///
    /// `--prop` overrides the config file prop; `--require-matches` and
    /// `--no-backup` override config settings when explicitly set.
    pub fn merge_apply_args(
        self,
        cli_prop: Option<&str>,
        cli_require_matches: bool,
        cli_no_backup: bool,
    ) -> MergedConfig {
        let prop = cli_prop
            .map(str::to_string)
            .or(self.config.policy.prop)
            .unwrap_or_else(|| DEFAULT_PROP.to_string());

        MergedConfig {
            prop,
            require_matches: cli_require_matches || self.config.policy.require_matches,
            backup_enabled: self.config.backups.enabled && !cli_no_backup,
            backup_suffix: self.config.backups.suffix,
        }
    }
}
