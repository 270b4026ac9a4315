//! Configuration file support for Ebb.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ebb/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound for any day-count setting (ten years)
pub const MAX_DAYS: i64 = 3660;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub prediction: PredictionConfig,

    #[serde(default)]
    pub trends: TrendConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Parameters of the cycle inference heuristics
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictionConfig {
    /// How many of the most recent period starts feed the cycle length average
    #[serde(default = "default_recent_starts")]
    pub recent_starts: usize,

    /// Gaps between starts at or above this are treated as data-entry errors
    #[serde(default = "default_max_cycle_gap_days")]
    pub max_cycle_gap_days: i64,

    /// An end must fall within this many days of a start to pair with it
    #[serde(default = "default_end_match_window_days")]
    pub end_match_window_days: i64,

    /// How many of the most recent period durations are averaged
    #[serde(default = "default_recent_durations")]
    pub recent_durations: usize,

    #[serde(default = "default_luteal_phase_days")]
    pub luteal_phase_days: i64,

    /// Days before ovulation that open the fertile window
    #[serde(default = "default_fertile_lead_days")]
    pub fertile_lead_days: i64,

    /// Used by phase classification when no period duration is known
    #[serde(default = "default_period_duration")]
    pub default_period_duration: i64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            recent_starts: default_recent_starts(),
            max_cycle_gap_days: default_max_cycle_gap_days(),
            end_match_window_days: default_end_match_window_days(),
            recent_durations: default_recent_durations(),
            luteal_phase_days: default_luteal_phase_days(),
            fertile_lead_days: default_fertile_lead_days(),
            default_period_duration: default_period_duration(),
        }
    }
}

/// Trailing windows used by the trend summary
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendConfig {
    #[serde(default = "default_short_window_days")]
    pub short_window_days: i64,

    #[serde(default = "default_long_window_days")]
    pub long_window_days: i64,

    #[serde(default = "default_top_symptom_limit")]
    pub top_symptom_limit: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            short_window_days: default_short_window_days(),
            long_window_days: default_long_window_days(),
            top_symptom_limit: default_top_symptom_limit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("ebb")
}

fn default_recent_starts() -> usize {
    4
}

fn default_max_cycle_gap_days() -> i64 {
    60
}

fn default_end_match_window_days() -> i64 {
    10
}

fn default_recent_durations() -> usize {
    3
}

fn default_luteal_phase_days() -> i64 {
    14
}

fn default_fertile_lead_days() -> i64 {
    5
}

fn default_period_duration() -> i64 {
    5
}

fn default_short_window_days() -> i64 {
    7
}

fn default_long_window_days() -> i64 {
    30
}

fn default_top_symptom_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("ebb").join("config.toml")
    }

    /// Reject parameter values the inference engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let p = &self.prediction;
        if p.recent_starts < 2 {
            return Err(Error::Config(
                "prediction.recent_starts must be at least 2".into(),
            ));
        }
        if p.recent_durations == 0 {
            return Err(Error::Config(
                "prediction.recent_durations must be positive".into(),
            ));
        }
        if p.max_cycle_gap_days <= 0 || p.end_match_window_days < 0 {
            return Err(Error::Config(
                "prediction day windows must be positive".into(),
            ));
        }
        if p.luteal_phase_days <= 0 || p.fertile_lead_days < 0 || p.default_period_duration <= 0 {
            return Err(Error::Config(
                "prediction phase lengths must be positive".into(),
            ));
        }

        let t = &self.trends;
        if t.short_window_days <= 0 || t.long_window_days <= 0 || t.top_symptom_limit == 0 {
            return Err(Error::Config("trend windows must be positive".into()));
        }

        let day_settings = [
            ("prediction.max_cycle_gap_days", p.max_cycle_gap_days),
            ("prediction.end_match_window_days", p.end_match_window_days),
            ("prediction.luteal_phase_days", p.luteal_phase_days),
            ("prediction.fertile_lead_days", p.fertile_lead_days),
            ("prediction.default_period_duration", p.default_period_duration),
            ("trends.short_window_days", t.short_window_days),
            ("trends.long_window_days", t.long_window_days),
        ];
        if let Some((name, days)) = day_settings.iter().find(|(_, days)| *days > MAX_DAYS) {
            return Err(Error::Config(format!(
                "{} is {} days; at most {} is allowed",
                name, days, MAX_DAYS
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.prediction.recent_starts, 4);
        assert_eq!(config.prediction.max_cycle_gap_days, 60);
        assert_eq!(config.prediction.end_match_window_days, 10);
        assert_eq!(config.prediction.luteal_phase_days, 14);
        assert_eq!(config.trends.short_window_days, 7);
        assert_eq!(config.trends.long_window_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[prediction]
luteal_phase_days = 12
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.prediction.luteal_phase_days, 12);
        assert_eq!(config.prediction.fertile_lead_days, 5); // default
        assert_eq!(config.trends.top_symptom_limit, 5);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.trends.top_symptom_limit = 3;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.trends.top_symptom_limit, 3);
        assert_eq!(loaded.prediction, PredictionConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[trends]\nshort_window_days = 0\n").unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_oversized_day_windows_rejected() {
        let mut config = Config::default();
        config.trends.long_window_days = 100_000_000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.prediction.luteal_phase_days = MAX_DAYS + 1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.trends.long_window_days = MAX_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[prediction\nrecent_starts = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Toml(_))));
    }
}
