//! Client configuration
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. TOML file: `$MBYTE_CONFIG`, else `<platform config dir>/config.toml` (optional)
//! 3. `MBYTE_*` environment variables (e.g. `MBYTE_MANAGER_BASE_URL`)

use crate::error::{HttpError, Result};
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use mbyte_core::domain::Application;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "MBYTE";
const CONFIG_PATH_VAR: &str = "MBYTE_CONFIG";

/// Values given on the command line, applied above every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub manager_base_url: Option<String>,
    pub store_base_url: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Manager API base URL (required)
    #[serde(default)]
    pub manager_base_url: String,

    /// Explicit store base URL; derived from the user's store app when absent
    #[serde(default)]
    pub store_base_url: Option<String>,

    pub stores_scheme: String,

    #[serde(default)]
    pub stores_domain: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,

    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            manager_base_url: String::new(),
            store_base_url: None,
            stores_scheme: "https".to_string(),
            stores_domain: None,
            access_token: None,
            request_timeout_secs: 30,
            poll_interval_ms: 2000,
            page_size: mbyte_core::port::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load with an explicit (optional) config file
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        Self::load_with(path, ConfigOverrides::default())
    }

    /// Load, then apply command-line overrides before validating
    pub fn load_with(path: Option<PathBuf>, overrides: ConfigOverrides) -> Result<Self> {
        let defaults = ClientConfig::default();
        let mut builder = Config::builder()
            .set_default("manager_base_url", defaults.manager_base_url)?
            .set_default("stores_scheme", defaults.stores_scheme)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("poll_interval_ms", defaults.poll_interval_ms)?
            .set_default("page_size", u64::from(defaults.page_size))?;

        if let Some(path) = path {
            debug!(path = %path.display(), "Reading config file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let config: ClientConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("manager_base_url", overrides.manager_base_url)?
            .set_override_option("store_base_url", overrides.store_base_url)?
            .set_override_option("access_token", overrides.access_token)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.manager_base_url.trim().is_empty() {
            return Err(HttpError::Config("manager_base_url is not set".to_string()));
        }
        if self.page_size == 0 {
            return Err(HttpError::Config("page_size must be positive".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(HttpError::Config("poll_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Store base URL: explicit setting, else `{scheme}://{app name}.{domain}/`
    /// of the first store application
    pub fn store_base_for(&self, apps: &[Application]) -> Option<String> {
        if let Some(url) = self.store_base_url.as_ref().filter(|u| !u.trim().is_empty()) {
            return Some(url.clone());
        }
        let domain = self.stores_domain.as_deref().filter(|d| !d.is_empty())?;
        let store = apps.iter().find(|app| app.is_store())?;
        Some(format!("{}://{}.{}/", self.stores_scheme, store.name, domain))
    }
}

/// `$MBYTE_CONFIG` (with `~` expanded), else the platform config file
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(shellexpand::tilde(&path).into_owned()));
    }
    ProjectDirs::from("", "", "mbyte").map(|dirs| dirs.config_dir().join("config.toml"))
}
