//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, or the platform config dir)
//! 3. `SCANCHECK_*` environment variables (`__` separates nested keys,
//!    e.g. `SCANCHECK_MATCHING__CASE_INSENSITIVE=true`)
//! 4. CLI flags, applied by the caller
//!
//! # Example file
//!
//! ```toml
//! cooldown_ms = 1500
//! cooldown_scope = "global"
//! header = "always"
//! audio_cue = false
//!
//! [matching]
//! case_insensitive = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::loader::HeaderPolicy;
use crate::output::ExportFormat;
use crate::source::NoiseFilter;
use crate::validator::{CooldownScope, MatchPolicy, ValidatorConfig, DEFAULT_COOLDOWN};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SCANCHECK_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cooldown window in milliseconds. Zero disables it.
    pub cooldown_ms: u64,
    /// Whether the cooldown applies per code or to all codes.
    pub cooldown_scope: CooldownScope,
    /// How codes are compared against the roster.
    pub matching: MatchPolicy,
    /// Header row handling for roster files.
    pub header: HeaderPolicy,
    /// Decoded strings shorter than this are treated as noise.
    pub min_code_length: usize,
    /// Ring the terminal bell on each recorded scan.
    pub audio_cue: bool,
    /// Accept `:clear`, `:reload` and `:stats` on the scan input.
    pub console_commands: bool,
    /// Default export format.
    pub export_format: ExportFormat,
    /// Directory for automatically named exports.
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN.as_millis() as u64,
            cooldown_scope: CooldownScope::Key,
            matching: MatchPolicy::exact(),
            header: HeaderPolicy::Auto,
            min_code_length: 1,
            audio_cue: true,
            console_commands: true,
            export_format: ExportFormat::Csv,
            export_dir: None,
        }
    }
}

impl Config {
    /// Load from the given file, or the default location if `None`.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    ///
    /// # Errors
    ///
    /// Returns an error if a file or variable cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default_path) = Self::config_path() {
                    log::debug!("Looking for config at {}", default_path.display());
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Invalid configuration")
    }

    /// Save as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Write the default settings to `path` for editing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists and `force` is not set, or if it
    /// cannot be written.
    pub fn init(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }
        Self::default().save(path)?;
        log::info!("Wrote default config to {}", path.display());
        Ok(())
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "scancheck", "scancheck")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Cooldown window as a duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Settings for the scan validator.
    #[must_use]
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig::default()
            .with_cooldown(self.cooldown())
            .with_cooldown_scope(self.cooldown_scope)
            .with_policy(self.matching)
    }

    /// Noise filter for decoded strings.
    #[must_use]
    pub fn noise_filter(&self) -> NoiseFilter {
        NoiseFilter {
            min_code_length: self.min_code_length.max(1),
        }
    }
}
