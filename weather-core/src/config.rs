use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::provider::openweather::ONE_CALL_URL;

/// Environment variable holding the OpenWeatherMap key.
pub const WEATHER_API_KEY_VAR: &str = "WEATHER_API";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";
pub const BIND_VAR: &str = "WEATHER_WEB_BIND";

/// A credential that never shows up in `Debug` output or on disk.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_str("ApiKey(<unset>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Only ever read from the environment.
    #[serde(skip)]
    pub api_key: ApiKey,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            base_url: ONE_CALL_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl WeatherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    #[serde(skip)]
    pub api_key: ApiKey,
    pub base_url: String,
    pub model: String,
    /// Upper bound on plan/act rounds in one conversation.
    pub max_steps: usize,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_steps: 8,
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7860".to_string(),
        }
    }
}

/// Process-wide configuration, loaded once at start-up and never mutated afterwards.
///
/// Example TOML:
/// [llm]
/// model = "gpt-4o-mini"
///
/// [server]
/// bind = "0.0.0.0:7860"
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherSettings,
    pub llm: LlmSettings,
    pub server: ServerSettings,
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    ///
    /// Without a platform config directory only defaults and the environment are used.
    pub fn load() -> Result<Self> {
        let path = match Self::config_file_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "No config file location; using defaults and environment");
                None
            }
        };
        Self::load_with(path.as_deref(), |name| std::env::var(name).ok())
    }

    /// `load` with the file location and environment lookup supplied by the caller.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        cfg.apply_env(lookup);
        Ok(cfg)
    }

    /// Read a config file, or return defaults if it doesn't exist.
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-agent", "weather-web")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the environment; `lookup` is `std::env::var` outside of tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(WEATHER_API_KEY_VAR) {
            self.weather.api_key = ApiKey::new(key);
        }
        if let Some(key) = lookup(OPENAI_API_KEY_VAR) {
            self.llm.api_key = ApiKey::new(key);
        }
        if let Some(url) = lookup(OPENAI_BASE_URL_VAR).filter(|v| !v.is_empty()) {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup(OPENAI_MODEL_VAR).filter(|v| !v.is_empty()) {
            self.llm.model = model;
        }
        if let Some(bind) = lookup(BIND_VAR).filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }
    }
}
