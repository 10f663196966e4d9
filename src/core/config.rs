use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com";
pub const DEFAULT_ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co";
/// Both providers accept this key for a handful of well-known symbols.
pub const DEFAULT_API_KEY: &str = "demo";

pub const FMP_API_KEY_ENV: &str = "FMP_API_KEY";
pub const ALPHAVANTAGE_API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    fn with_base_url(base_url: &str) -> Self {
        ProviderConfig {
            base_url: base_url.to_string(),
            api_key: None,
        }
    }

    /// The environment wins over the file, and the file over the built-in key.
    pub fn api_key(&self, env_var: &str) -> String {
        resolve_api_key(self.api_key.as_deref(), std::env::var(env_var).ok())
    }
}

fn resolve_api_key(configured: Option<&str>, from_env: Option<String>) -> String {
    from_env
        .filter(|key| !key.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_API_KEY.to_string())
}

/// A provider set to `None` is left out of every fallback chain. An omitted
/// provider keeps its default.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub fmp: Option<ProviderConfig>,
    pub alphavantage: Option<ProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fmp: Some(ProviderConfig::with_base_url(DEFAULT_FMP_BASE_URL)),
            alphavantage: Some(ProviderConfig::with_base_url(
                DEFAULT_ALPHAVANTAGE_BASE_URL,
            )),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Seed for the synthetic fallback data. Unset means a fresh seed per run.
    pub synthetic_seed: Option<u64>,
}

impl AppConfig {
    /// Loads the config from the default location, or the built-in defaults
    /// when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "tickerdash", "tickerdash")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
