//! Configuration management for leaderboard computations.
//!
//! Settings are layered with the `config` crate; later sources override
//! earlier ones:
//!
//! 1. Built-in defaults
//! 2. The settings file (`--config` path, else `ramp-leaderboard.toml` if present)
//! 3. Environment variables prefixed with `RAMP_LB_` (`__` separates nesting)
//! 4. Explicit overrides, usually command-line flags
//!
//! ## Example Configuration
//!
//! ```toml
//! primary_metric = "accuracy"
//! secondary_metric = "nll"
//! tie_policy = "distinct"
//! missing_metadata = "fail"
//! step = "valid"
//!
//! [metrics.accuracy]
//! direction = "higher_is_better"
//! strategy = { type = "mean" }
//! n_folds = 3
//! tolerance = 0.001
//! range = { min = 0.0, max = 1.0 }
//!
//! [metrics.nll]
//! direction = "lower_is_better"
//! strategy = { type = "bagged", weighting = { type = "cumulative" } }
//! n_folds = 3
//!
//! [display]
//! precision = 4
//!
//! [telemetry]
//! log_level = "info"
//! format = "json"
//! ```

use crate::telemetry::LogFormat;
use anyhow::{Context, Result};
use ramp_leaderboard_domain::{
    CombinationStrategy, ConfigError, Direction, LeaderboardConfig, MetricDefinition, MetricId,
    MetricRange, MetricSet, MissingMetadataPolicy, RankingConfig, TiePolicy,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings file looked up in the working directory when no path is given
pub const DEFAULT_SETTINGS_FILE: &str = "ramp-leaderboard.toml";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "RAMP_LB";

/// Leaderboard settings as written in the settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    /// Metric the leaderboard is ordered by
    pub primary_metric: String,

    /// Metric breaking ties inside a tie group
    #[serde(default)]
    pub secondary_metric: Option<String>,

    #[serde(default)]
    pub tie_policy: TiePolicy,

    #[serde(default)]
    pub missing_metadata: MissingMetadataPolicy,

    /// Row of RAMP `scores.csv` files read by directory ingestion
    #[serde(default = "default_step")]
    pub step: String,

    /// Metric definitions keyed by metric id
    pub metrics: BTreeMap<String, MetricSettings>,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// One `[metrics.<id>]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSettings {
    pub direction: Direction,

    #[serde(default)]
    pub strategy: CombinationStrategy,

    pub n_folds: u32,

    #[serde(default)]
    pub tolerance: f64,

    #[serde(default)]
    pub range: Option<MetricRange>,
}

/// Rendering defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Decimal places of rendered scores
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log line format; the user preference applies when unset
    #[serde(default)]
    pub format: Option<LogFormat>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            format: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TelemetrySection {
    #[serde(default)]
    telemetry: TelemetrySettings,
}

impl TelemetrySettings {
    /// Read only the `[telemetry]` table from the same sources as
    /// [`LeaderboardSettings::load`], so logging can be set up before the
    /// rest of the settings are known to be valid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };
        Self::build(file)
    }

    /// Read the `[telemetry]` table from TOML text
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::build(config::File::from_str(toml, config::FileFormat::Toml))
    }

    fn build<T>(file: T) -> Result<Self>
    where
        T: config::Source + Send + Sync + 'static,
    {
        let section: TelemetrySection = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize telemetry settings")?;

        section.telemetry.validate()?;
        Ok(section.telemetry)
    }

    fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.log_level,
                valid_levels
            );
        }
        Ok(())
    }
}

// Default value functions
fn default_step() -> String {
    "valid".to_string()
}

fn default_precision() -> usize {
    4
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Values that take precedence over every other configuration source
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub primary_metric: Option<String>,
    pub secondary_metric: Option<String>,
    pub tie_policy: Option<TiePolicy>,
    pub missing_metadata: Option<MissingMetadataPolicy>,
    pub step: Option<String>,
    pub precision: Option<usize>,
}

impl LeaderboardSettings {
    /// Load settings from the given file, or from `ramp-leaderboard.toml`
    /// in the working directory when it exists.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ramp_leaderboard_common::config::{LeaderboardSettings, SettingsOverrides};
    ///
    /// let settings = LeaderboardSettings::load(None, &SettingsOverrides::default())
    ///     .expect("Failed to load settings");
    /// println!("Ranking by {}", settings.primary_metric);
    /// ```
    pub fn load(path: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };
        Self::build(file, overrides)
    }

    /// Load settings from TOML text, still honouring environment overrides
    pub fn from_toml_str(toml: &str, overrides: &SettingsOverrides) -> Result<Self> {
        Self::build(
            config::File::from_str(toml, config::FileFormat::Toml),
            overrides,
        )
    }

    fn build<T>(file: T, overrides: &SettingsOverrides) -> Result<Self>
    where
        T: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .set_default("step", default_step())?
            .add_source(file)
            // Example: RAMP_LB_PRIMARY_METRIC=nll, RAMP_LB_DISPLAY__PRECISION=6
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("primary_metric", overrides.primary_metric.clone())?
            .set_override_option("secondary_metric", overrides.secondary_metric.clone())?
            .set_override_option("tie_policy", overrides.tie_policy.map(tie_policy_name))?
            .set_override_option(
                "missing_metadata",
                overrides.missing_metadata.map(missing_metadata_name),
            )?
            .set_override_option("step", overrides.step.clone())?
            .set_override_option("display.precision", overrides.precision.map(|p| p as u64))?
            .build()
            .context("Failed to build configuration")?;

        let settings: LeaderboardSettings = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            anyhow::bail!("At least one metric must be configured under [metrics]");
        }

        if !self.metrics.contains_key(&self.primary_metric) {
            anyhow::bail!(
                "Primary metric '{}' is not configured under [metrics]",
                self.primary_metric
            );
        }

        if let Some(secondary) = &self.secondary_metric {
            if !self.metrics.contains_key(secondary) {
                anyhow::bail!("Secondary metric '{}' is not configured under [metrics]", secondary);
            }
        }

        if self.step.trim().is_empty() {
            anyhow::bail!("Step must not be empty");
        }

        self.telemetry.validate()
    }

    /// Convert into the engine configuration, validating every metric
    pub fn to_leaderboard_config(&self) -> std::result::Result<LeaderboardConfig, ConfigError> {
        let definitions = self
            .metrics
            .iter()
            .map(|(id, metric)| -> std::result::Result<MetricDefinition, ConfigError> {
                Ok(MetricDefinition {
                    id: MetricId::new(id.as_str())?,
                    direction: metric.direction,
                    strategy: metric.strategy.clone(),
                    n_folds: metric.n_folds,
                    tolerance: metric.tolerance,
                    range: metric.range,
                })
            })
            .collect::<std::result::Result<Vec<_>, ConfigError>>()?;

        let mut ranking = RankingConfig::new(MetricId::new(self.primary_metric.as_str())?)
            .with_tie_policy(self.tie_policy);
        if let Some(secondary) = &self.secondary_metric {
            ranking = ranking.with_secondary(MetricId::new(secondary.as_str())?);
        }

        Ok(LeaderboardConfig::new(MetricSet::new(definitions)?, ranking)
            .with_missing_metadata(self.missing_metadata))
    }
}

fn tie_policy_name(policy: TiePolicy) -> &'static str {
    match policy {
        TiePolicy::Distinct => "distinct",
        TiePolicy::Shared => "shared",
    }
}

fn missing_metadata_name(policy: MissingMetadataPolicy) -> &'static str {
    match policy {
        MissingMetadataPolicy::Fail => "fail",
        MissingMetadataPolicy::Placeholder => "placeholder",
    }
}
