use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::provider::openweather::DEFAULT_BASE_URL;

const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
const ENV_ENVIRONMENT: &str = "ENVIRONMENT";
const ENV_CACHE_TTL: &str = "CACHE_TTL";
const ENV_BASE_URL: &str = "OPENWEATHER_BASE_URL";

/// Application settings. Loaded once at startup and passed down explicitly.
///
/// Example TOML:
/// ```toml
/// openweather_api_key = "..."
/// environment = "production"
/// cors_origins = ["https://dashboard.example"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openweather_api_key: Option<String>,

    /// Free-form environment name, e.g. "development" or "production".
    pub environment: String,

    /// Seconds. Loaded for compatibility; nothing is cached.
    pub cache_ttl: u64,

    /// Provider root, without trailing slash.
    pub base_url: String,

    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            environment: "development".to_string(),
            cache_ttl: 300,
            base_url: DEFAULT_BASE_URL.to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
        }
    }
}

impl Config {
    /// Load config from the platform config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Override fields from environment-style variables looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = var(ENV_API_KEY) {
            self.openweather_api_key = Some(key);
        }
        if let Some(env) = var(ENV_ENVIRONMENT) {
            self.environment = env;
        }
        if let Some(ttl) = var(ENV_CACHE_TTL) {
            self.cache_ttl = ttl.trim().parse().with_context(|| {
                format!("{ENV_CACHE_TTL} must be a whole number of seconds, got '{ttl}'")
            })?;
        }
        if let Some(url) = var(ENV_BASE_URL) {
            self.base_url = url;
        }
        Ok(())
    }

    /// Save config to the platform config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather_api_key = Some(api_key);
    }

    /// The API key, or an error telling the user how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.openweather_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather configure` or set {ENV_API_KEY}."
                )
            })
    }
}
