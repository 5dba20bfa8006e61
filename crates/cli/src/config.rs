//! CLI preferences
//!
//! Handles loading and saving per-user preferences from
//! ~/.ramp-leaderboard/config.toml. Leaderboard semantics (metrics, ranking)
//! live in the project settings file, not here.

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use ramp_leaderboard_common::config::TelemetrySettings;
use ramp_leaderboard_common::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// CLI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_colored")]
    pub colored: bool,

    /// Decimal places of rendered scores, overriding the settings file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<usize>,

    /// Directory of the leaderboard cache (defaults to the user cache dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_colored() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            colored: default_colored(),
            precision: None,
            cache_dir: None,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".ramp-leaderboard"))
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load preferences from file, falling back to defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::stored()?;

        if let Ok(format) = std::env::var("RAMP_LB_OUTPUT_FORMAT") {
            if let Some(format) = OutputFormat::from_str(&format) {
                config.output_format = format;
            }
        }
        if std::env::var("NO_COLOR").is_ok() {
            config.colored = false;
        }

        Ok(config)
    }

    /// Preferences as saved, without environment overrides
    pub fn stored() -> Result<Self> {
        let config_file = Self::config_file()?;

        if !config_file.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_file).context("Failed to read config file")?;
        Self::from_toml(&contents)
    }

    fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()?;
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        let config_file = Self::config_file()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_file, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Cache directory in effect, if any can be determined
    pub fn effective_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("ramp-leaderboard")))
    }

    /// Log format and level to install: the settings file format wins over
    /// the preference, `--verbose` wins over the configured level.
    pub fn tracing_setup(&self, telemetry: &TelemetrySettings, verbose: bool) -> (LogFormat, String) {
        let format = telemetry.format.unwrap_or(self.log_format);
        let level = if verbose {
            "debug".to_string()
        } else {
            telemetry.log_level.clone()
        };
        (format, level)
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "output_format" | "output-format" | "format" => Some(self.output_format.to_string()),
            "colored" | "color" => Some(self.colored.to_string()),
            "precision" => self.precision.map(|p| p.to_string()),
            "cache_dir" | "cache-dir" => self
                .effective_cache_dir()
                .map(|dir| dir.display().to_string()),
            "log_format" | "log-format" => Some(format!("{:?}", self.log_format).to_lowercase()),
            _ => None,
        }
    }

    /// Set a configuration value by key, without saving
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_format" | "output-format" | "format" => {
                self.output_format = OutputFormat::from_str(value).with_context(|| {
                    format!("Invalid output format: {}. Use json, table, or plain", value)
                })?;
            }
            "colored" | "color" => {
                self.colored = value.parse().context("Invalid boolean value")?;
            }
            "precision" => {
                self.precision = Some(value.parse().context("Invalid precision value")?);
            }
            "cache_dir" | "cache-dir" => {
                self.cache_dir = Some(PathBuf::from(value));
            }
            "log_format" | "log-format" => {
                self.log_format = value.parse().map_err(anyhow::Error::msg)?;
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }
}
