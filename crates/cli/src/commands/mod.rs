//! CLI commands

pub mod leaderboard;
pub mod preferences;

use crate::config::Config;
use crate::output::OutputFormat;
use ramp_leaderboard_infrastructure::{FsLeaderboardCache, LeaderboardCache};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Context passed to all commands
pub struct CommandContext {
    /// User preferences
    pub config: Config,
    /// Leaderboard settings file given with `--config`
    pub settings_path: Option<PathBuf>,
    pub verbose: bool,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Config, settings_path: Option<PathBuf>, verbose: bool) -> Self {
        Self {
            config,
            settings_path,
            verbose,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.config.output_format
    }

    /// Whether tables may use terminal colors
    pub fn styled(&self) -> bool {
        self.config.colored
    }

    /// The leaderboard cache, unless disabled or no cache directory is known
    pub fn cache(&self, no_cache: bool) -> Option<Arc<dyn LeaderboardCache>> {
        if no_cache {
            return None;
        }
        let dir = self.config.effective_cache_dir()?;
        debug!(dir = %dir.display(), "Using leaderboard cache");
        Some(Arc::new(FsLeaderboardCache::new(dir)))
    }
}
