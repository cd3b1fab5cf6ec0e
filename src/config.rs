use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// Remote API that performs the actual page fetch and scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub sitename: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub sitename_timeouts: HashMap<String, u64>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON document holding labels and product page configs.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily rolling log files are written here when set.
    pub directory: Option<String>,
}

impl ApiConfig {
    pub fn timeout_for(&self, sitename: &str) -> Duration {
        let secs = self
            .sitename_timeouts
            .get(sitename)
            .copied()
            .unwrap_or(self.timeout_secs);
        Duration::from_secs(secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8060/api/".to_string(),
            sitename: "gemini".to_string(),
            timeout_secs: 15,
            sitename_timeouts: HashMap::from([
                ("sofmap".to_string(), 17),
                ("geo".to_string(), 18),
                ("gemini".to_string(), 300),
            ]),
            user_agent: "ExSearch/0.1".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load(Path::new("config"), &run_mode)
    }

    /// Layer `default`, `{run_mode}` and `local` files from `dir`, then
    /// `EX_SEARCH__*` environment variables.
    pub fn load(dir: &Path, run_mode: &str) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();
        let mut builder = Config::builder()
            .set_default("api.base_url", defaults.base_url)?
            .set_default("api.sitename", defaults.sitename)?
            .set_default("api.timeout_secs", defaults.timeout_secs as i64)?
            .set_default("api.user_agent", defaults.user_agent)?
            .set_default("logging.level", "info")?;
        for (sitename, secs) in defaults.sitename_timeouts {
            builder = builder.set_default(format!("api.sitename_timeouts.{}", sitename), secs as i64)?;
        }

        let s = builder
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(run_mode)).required(false))
            // Local overrides (ignored by git)
            .add_source(File::from(dir.join("local")).required(false))
            .add_source(Environment::with_prefix("EX_SEARCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::Message("Invalid API base URL format".into())),
        }

        if self.api.sitename.trim().is_empty() {
            return Err(ConfigError::Message("API sitename must not be empty".into()));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Message("API timeout_secs must be greater than 0".into()));
        }

        if let Some((sitename, _)) = self.api.sitename_timeouts.iter().find(|(_, secs)| **secs == 0) {
            return Err(ConfigError::Message(format!(
                "API timeout for sitename '{}' must be greater than 0",
                sitename
            )));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Message(format!(
                "Invalid logging level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}
