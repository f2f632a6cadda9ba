use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.airnowapi.org/aq/observation/zipCode/current/";
pub const DEFAULT_DISTANCE: u32 = 25;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_THRESHOLD: i32 = 100;

/// Environment variable that overrides `[airnow].api_key`
pub const API_KEY_ENV: &str = "AIRNOW_API_KEY";

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AirNowConfig {
    pub base_url: Option<String>,
    pub distance: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub api_key: Option<String>,
}

impl fmt::Debug for AirNowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirNowConfig")
            .field("base_url", &self.base_url)
            .field("distance", &self.distance)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl AirNowConfig {
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("{raw}: {e}")))
    }

    pub fn distance(&self) -> u32 {
        self.distance.unwrap_or(DEFAULT_DISTANCE)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// User preferences that feed a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Preferences {
    pub zip_code: Option<String>,
    pub threshold: Option<i32>,
    pub notifications_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub airnow: Option<AirNowConfig>,
    pub preferences: Option<Preferences>,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("AirNow API key not configured (set AIRNOW_API_KEY or [airnow].api_key)")]
    MissingApiKey,
    #[error("Invalid base URL {0}")]
    InvalidUrl(String),
}

impl AppConfig {
    /// Load configuration from AQI_CONFIG path (TOML) if present, with reasonable defaults.
    /// `AIRNOW_API_KEY` wins over a key found in the file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("AQI_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = Self::from_path(&path)?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            cfg.set_api_key(key);
        }
        Ok(cfg)
    }

    /// Read a TOML file, falling back to defaults when it does not exist.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    pub fn set_api_key(&mut self, key: String) {
        self.airnow.get_or_insert_with(AirNowConfig::default).api_key = Some(key);
    }

    pub fn airnow(&self) -> AirNowConfig {
        self.airnow.clone().unwrap_or_default()
    }

    /// Default ZIP code, if the user saved one
    pub fn zip_code(&self) -> Option<String> {
        self.preferences
            .as_ref()
            .and_then(|p| p.zip_code.clone())
            .filter(|z| !z.trim().is_empty())
    }

    pub fn threshold(&self) -> i32 {
        self.preferences
            .as_ref()
            .and_then(|p| p.threshold)
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.preferences
            .as_ref()
            .and_then(|p| p.notifications_enabled)
            .unwrap_or(false)
    }

    /// Get HTTP bind address (default 127.0.0.1:8080)
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|h| h.bind.clone())
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
    }
}
