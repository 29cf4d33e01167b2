use aiswitch_client::api::DEFAULT_BASE_URL;
use aiswitch_client::client::HttpClientConfig;
use aiswitch_client::ApiConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{Level, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// API root of the backend
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Load from an explicit path, else from the default location if a file
    /// exists there, else built-in defaults
    pub fn load(explicit: Option<&str>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            let expanded = shellexpand::tilde(path).to_string();
            return Self::from_file(expanded);
        }

        match default_path() {
            Some(path) if path.is_file() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("AISWITCH_URL") {
            self.api.url = val;
        }

        if let Ok(val) = std::env::var("AISWITCH_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid AISWITCH_TIMEOUT_SECS '{}'", val),
            }
        }

        if let Ok(val) = std::env::var("AISWITCH_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    pub fn log_level(&self) -> Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api.url.clone()).with_client_config(
            HttpClientConfig::default().with_timeout_secs(self.api.timeout_secs),
        )
    }
}

/// `<config_dir>/aiswitch/console.yaml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("aiswitch").join("console.yaml"))
}

fn default_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}
