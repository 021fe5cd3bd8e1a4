//! Configuration infrastructure
//!
//! Contains configuration loading for the offer scraper.
//!
//! Configuration is layered:
//! 1. A YAML file (default `resources/config.yml`) with the `scraper.sites` list
//! 2. Environment overrides prefixed `OFFER_SCRAPER`, nested with `__`
//!    (e.g. `OFFER_SCRAPER__DATABASE__URL=sqlite:/tmp/offers.db`)
//!
//! Every section except `scraper.sites` has defaults.

#![allow(clippy::uninlined_format_args)]

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::site::SiteDescriptor;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sites and fetch behaviour
    pub scraper: ScraperConfig,

    /// Offer store location
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report delivery settings
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Scraping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Sites to scrape, in order
    pub sites: Vec<SiteDescriptor>,

    /// Request timeout in seconds
    #[serde(default = "defaults::request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// User agent string sent with every request
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Sites fetched at the same time; 1 means strictly sequential
    #[serde(default = "defaults::max_concurrent_sites")]
    pub max_concurrent_sites: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL, e.g. `sqlite:offers.db`
    #[serde(default = "defaults::database_url")]
    pub url: String,

    /// Pool size
    #[serde(default = "defaults::max_connections")]
    pub max_connections: u32,

    /// How long a writer waits for a locked database, in milliseconds
    #[serde(default = "defaults::busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Enable JSON formatted file logs
    #[serde(default)]
    pub json_format: bool,

    /// Enable console output
    #[serde(default = "defaults::enabled")]
    pub console_output: bool,

    /// Enable daily log file output
    #[serde(default = "defaults::enabled")]
    pub file_output: bool,

    /// Log directory; defaults to `logs` next to the working directory
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Log file name prefix; the date is appended by the daily appender
    #[serde(default = "defaults::log_file_prefix")]
    pub file_prefix: String,

    /// Module-specific log level filters (e.g., "sqlx": "warn", "reqwest": "info")
    #[serde(default)]
    pub module_filters: HashMap<String, String>,
}

/// Report delivery settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Report recipients; no recipients means no delivery
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Subject override; the generated subject is used when unset
    #[serde(default)]
    pub subject: Option<String>,

    /// Deliver a report even when no new offers were stored
    #[serde(default)]
    pub notify_when_empty: bool,

    /// Write reports to this directory instead of the log
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: defaults::database_url(),
            max_connections: defaults::max_connections(),
            busy_timeout_ms: defaults::busy_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            json_format: false,
            console_output: true,
            file_output: true,
            directory: None,
            file_prefix: defaults::log_file_prefix(),
            module_filters: HashMap::new(),
        }
    }
}

impl ScraperConfig {
    /// Scraper settings with defaults for everything but the sites
    pub fn with_sites(sites: Vec<SiteDescriptor>) -> Self {
        Self {
            sites,
            request_timeout_seconds: defaults::request_timeout_seconds(),
            user_agent: defaults::user_agent(),
            max_concurrent_sites: defaults::max_concurrent_sites(),
        }
    }
}

impl AppConfig {
    /// Check invariants the type system does not carry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scraper.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "scraper.request_timeout_seconds must be greater than 0".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for site in &self.scraper.sites {
            if site.id.trim().is_empty() {
                return Err(ConfigError::Validation {
                    message: "every site needs a non-empty id".to_string(),
                });
            }
            if !seen.insert(site.id.as_str()) {
                return Err(ConfigError::Validation {
                    message: format!("duplicate site id '{}'", site.id),
                });
            }
        }

        Ok(())
    }
}

/// Loads and holds the application configuration
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    config: AppConfig,
}

impl ConfigLoader {
    pub const DEFAULT_CONFIG_PATH: &'static str = "resources/config.yml";
    pub const ENV_PREFIX: &'static str = "OFFER_SCRAPER";

    /// Load from a YAML file layered with environment overrides
    pub fn new(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(config::Environment::with_prefix(Self::ENV_PREFIX).separator("__"))
            .build()?;

        let config = Self::finish(settings)?;
        info!(
            "Configuration loaded from '{}' ({} sites)",
            path.display(),
            config.scraper.sites.len()
        );

        Ok(Self {
            config_path: Some(path.to_path_buf()),
            config,
        })
    }

    /// Load from YAML text, without environment overrides
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?;

        Ok(Self {
            config_path: None,
            config: Self::finish(settings)?,
        })
    }

    fn finish(settings: config::Config) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        if config.scraper.sites.is_empty() {
            warn!("No sites configured to scrape");
        }
        Ok(config)
    }

    /// Site descriptors in configured order
    pub fn get_sites_config(&self) -> &[SiteDescriptor] {
        &self.config.scraper.sites
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Get the configuration file path, if loaded from a file
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Default configuration values
pub mod defaults {
    use std::path::PathBuf;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Browser identification sent with every request
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Default number of sites in flight
    pub const MAX_CONCURRENT_SITES: usize = 1;

    /// Database file name inside the data directory
    pub const DATABASE_FILE: &str = "offers.db";

    /// Default pool size
    pub const MAX_CONNECTIONS: u32 = 5;

    /// Default SQLite busy timeout in milliseconds
    pub const BUSY_TIMEOUT_MS: u64 = 5000;

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default log file prefix
    pub const LOG_FILE_PREFIX: &str = "offer-scraper.log";

    pub fn request_timeout_seconds() -> u64 {
        REQUEST_TIMEOUT_SECONDS
    }

    pub fn user_agent() -> String {
        USER_AGENT.to_string()
    }

    pub fn max_concurrent_sites() -> usize {
        MAX_CONCURRENT_SITES
    }

    pub fn max_connections() -> u32 {
        MAX_CONNECTIONS
    }

    pub fn busy_timeout_ms() -> u64 {
        BUSY_TIMEOUT_MS
    }

    pub fn log_level() -> String {
        LOG_LEVEL.to_string()
    }

    pub fn log_file_prefix() -> String {
        LOG_FILE_PREFIX.to_string()
    }

    pub const fn enabled() -> bool {
        true
    }

    /// Application data directory, falling back to the working directory
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("offer-scraper"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// SQLite URL inside the application data directory
    pub fn database_url() -> String {
        format!("sqlite:{}", data_dir().join(DATABASE_FILE).display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
scraper:
  sites:
    - id: olx
      url: https://www.olx.pl/praca/krakow/
      selectors:
        offerBox: "div[data-cy='l-card']"
        title: h6
        url: a
        company: ".company"
        addInfo: "ul.tags"
    - id: pracuj
      url: https://www.pracuj.pl/praca/krakow
      selectors:
        offerBox: ".offer"
        title: h2
database:
  url: "sqlite::memory:"
notification:
  recipients: ["ops@example.com"]
"#;

    #[test]
    fn loads_sites_with_camel_case_keys() {
        let loader = ConfigLoader::from_yaml_str(SAMPLE).unwrap();
        let sites = loader.get_sites_config();

        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].id, "olx");
        let selectors = sites[0].selectors.as_ref().unwrap();
        assert_eq!(selectors.offer_box.as_deref(), Some("div[data-cy='l-card']"));
        assert_eq!(selectors.add_info.as_deref(), Some("ul.tags"));
        assert!(selectors.required().is_ok());

        // second site lacks a url selector; that is the scraper's concern, not the loader's
        assert!(sites[1].selectors.as_ref().unwrap().required().is_err());
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let config = ConfigLoader::from_yaml_str(SAMPLE).unwrap().into_config();
        assert_eq!(config.scraper.request_timeout_seconds, defaults::REQUEST_TIMEOUT_SECONDS);
        assert_eq!(config.scraper.max_concurrent_sites, 1);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.notification.recipients, ["ops@example.com"]);
        assert!(!config.notification.notify_when_empty);
    }

    #[test]
    fn missing_sites_section_is_rejected() {
        let result = ConfigLoader::from_yaml_str("scraper:\n  user_agent: x\n");
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn duplicate_site_ids_are_rejected() {
        let yaml = "scraper:\n  sites:\n    - id: a\n    - id: a\n";
        let result = ConfigLoader::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = ConfigLoader::new("does/not/exist.yml");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, SAMPLE).unwrap();

        let loader = ConfigLoader::new(&path).unwrap();
        assert_eq!(loader.get_sites_config().len(), 2);
        assert_eq!(loader.config_path(), Some(path.as_path()));
    }
}
