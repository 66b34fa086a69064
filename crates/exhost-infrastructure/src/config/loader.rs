//! Configuration loader
//!
//! Layers the extension settings, later layers winning:
//!
//! ```text
//! AppConfig::default()
//!   └─▶ exhost.toml        explicit path, else the first default location found
//!         └─▶ EXHOST__*    e.g. EXHOST__LIFECYCLE__STRICT_LIFECYCLE=false
//! ```
//!
//! The merged result is validated before it is handed to the provider
//! builder.

use std::path::{Path, PathBuf};

use exhost_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

use crate::config::AppConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};

/// Loads [`AppConfig`] from defaults, a TOML file and the environment
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader searching the default locations with the `EXHOST` prefix
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Read this file instead of searching the default locations
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Explicit configuration file, if one was set
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Merge every layer and validate the result
    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self
            .figment()
            .extract()
            .map_err(|e| Error::config_with_source("Failed to extract configuration", e))?;
        validate(&config)?;
        Ok(config)
    }

    /// Write `config` as pretty TOML to `path`
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let path = path.as_ref();
        let rendered =
            toml::to_string_pretty(config).config_context("Failed to render configuration")?;
        std::fs::write(path, rendered)
            .config_context(format!("Failed to write {}", path.display()))
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        match self.file_layer() {
            Some(path) if path.exists() => {
                log_config_loaded(&path, true);
                figment = figment.merge(Toml::file(path));
            }
            Some(path) => log_config_loaded(&path, false),
            None => {}
        }

        let prefix = format!("{}{}", self.env_prefix, CONFIG_ENV_SEPARATOR);
        figment.merge(Env::prefixed(&prefix).split(CONFIG_ENV_SEPARATOR))
    }

    /// The explicit path, else the first default location that exists
    fn file_layer(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            return Some(path.clone());
        }
        default_locations().into_iter().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Working directory, its `exhost/` subdirectory, then the user config dir
fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::with_capacity(3);
    if let Ok(cwd) = std::env::current_dir() {
        locations.push(cwd.join(DEFAULT_CONFIG_FILENAME));
        locations.push(cwd.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME));
    }
    if let Some(user) = dirs::config_dir() {
        locations.push(user.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME));
    }
    locations
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.composition.namespace.trim().is_empty() {
        return Err(Error::config("Composition namespace cannot be empty"));
    }
    if config.composition.running_version.trim().is_empty() {
        return Err(Error::config("Running build version cannot be empty"));
    }
    parse_log_level(&config.logging.level).map(|_| ())
}
