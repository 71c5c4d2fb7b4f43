use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Task;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(alias = "Smtp")]
    pub smtp: SmtpConfig,
    #[serde(alias = "Storage", default)]
    pub storage: StorageConfig,
    #[serde(alias = "Fetch", default)]
    pub fetch: FetchConfig,
    #[serde(alias = "Metrics", default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(alias = "Server")]
    pub server: String,
    #[serde(alias = "Port")]
    pub port: u16,
    #[serde(alias = "User", default)]
    pub user: String,
    #[serde(alias = "Password", default)]
    pub password: String,
    /// Sender address; the SMTP user when unset.
    #[serde(alias = "From", default)]
    pub from: Option<String>,
    #[serde(alias = "UseTls", alias = "usetls", default = "default_use_tls")]
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(alias = "PriceDir", alias = "pricedir")]
    pub price_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    #[serde(alias = "TimeoutSecs", alias = "timeoutsecs")]
    pub timeout_secs: u64,
    #[serde(alias = "UserAgent", alias = "useragent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    #[serde(alias = "Enabled")]
    pub enabled: bool,
    #[serde(alias = "Port")]
    pub port: u16,
}

fn default_use_tls() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            price_dir: PathBuf::from("./logs/price"),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("pricewatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9000,
        }
    }
}

impl SmtpConfig {
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.user)
    }
}

impl AppConfig {
    /// Reads `<conf_dir>/conf.json`, an optional `<conf_dir>/local` override and
    /// `PRICEWATCH__*` environment variables, in that order.
    pub fn load(conf_dir: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(conf_dir.join("conf.json")))
            .add_source(File::from(conf_dir.join("local")).required(false))
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Message("Fetch timeout_secs must be greater than 0".into()));
        }

        if self.storage.price_dir.as_os_str().is_empty() {
            return Err(ConfigError::Message("Storage price_dir must not be empty".into()));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message("Metrics port must be greater than 0".into()));
        }

        Ok(())
    }
}

/// Reads the task list: a JSON array of task records.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_tasks(&raw)
}

pub fn parse_tasks(raw: &str) -> Result<Vec<Task>, AppError> {
    Ok(serde_json::from_str(raw)?)
}
