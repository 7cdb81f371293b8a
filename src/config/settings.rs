use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analytics::streak::{DEFAULT_LEADING_GAP_DAYS, DEFAULT_MAX_LOOKBACK_DAYS};
use crate::analytics::{HabitScope, StreakPolicy, TimeRange, WeekStart};

fn default_leading_gap_days() -> u32 {
    DEFAULT_LEADING_GAP_DAYS
}
fn default_max_lookback_days() -> u32 {
    DEFAULT_MAX_LOOKBACK_DAYS
}
fn default_color() -> String {
    "#6366f1".to_string()
}
fn default_tick_rate_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Days without a completion tolerated before the current streak starts.
    #[serde(default = "default_leading_gap_days")]
    pub leading_gap_days: u32,
    #[serde(default = "default_max_lookback_days")]
    pub max_lookback_days: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            leading_gap_days: default_leading_gap_days(),
            max_lookback_days: default_max_lookback_days(),
        }
    }
}

impl StreakConfig {
    pub fn policy(&self) -> StreakPolicy {
        StreakPolicy {
            leading_gap_days: self.leading_gap_days,
            max_lookback_days: self.max_lookback_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub default_range: TimeRange,
    /// Whether inactive habits count toward totals.
    #[serde(default)]
    pub scope: HabitScope,
    #[serde(default)]
    pub week_start: WeekStart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_color")]
    pub default_color: String,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "habitrack")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("habitrack.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
