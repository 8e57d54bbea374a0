//! Configuration file support for Workout Forge.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/workout-forge/config.toml`.

use crate::composer::ComposerLimits;
use crate::weekly::WeeklySettings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "workout-forge";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub composer: ComposerLimits,

    #[serde(default)]
    pub weekly: WeeklySettings,

    #[serde(default)]
    pub generator: GeneratorConfig,
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

/// Exercise catalog location; the built-in catalog is used when unset
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// External plan generator configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many catalog entries are sent along as context
    #[serde(default = "default_exercise_sample")]
    pub exercise_sample: usize,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            exercise_sample: default_exercise_sample(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Default value functions
fn home_or_cwd() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_or_cwd().join(".local/share"));
    base.join(APP_DIR)
}

fn default_enabled() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_exercise_sample() -> usize {
    15
}

fn default_max_tokens() -> u32 {
    2500
}

fn default_temperature() -> f32 {
    0.7
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
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_or_cwd().join(".config"));
        base.join(APP_DIR).join("config.toml")
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

    /// Reject values the composers cannot work with
    fn check(&self) -> Result<()> {
        let weekly = &self.weekly;
        if weekly.min_exercises_per_day == 0 || weekly.min_exercises_per_day > weekly.max_exercises_per_day {
            return Err(Error::Config(format!(
                "weekly.min_exercises_per_day ({}) must be between 1 and max_exercises_per_day ({})",
                weekly.min_exercises_per_day, weekly.max_exercises_per_day
            )));
        }
        if weekly.minutes_per_exercise == 0 {
            return Err(Error::Config("weekly.minutes_per_exercise must be positive".into()));
        }

        let composer = &self.composer;
        let fractions = [composer.main_phase_fill, composer.cooldown_threshold];
        if fractions.iter().any(|f| !(f.is_finite() && *f > 0.0 && *f <= 1.0)) {
            return Err(Error::Config(
                "composer fill fractions must be within (0, 1]".into(),
            ));
        }
        Ok(())
    }
}
