//! Structured logging with tracing
//!
//! Provides the default logging-configuration service. The provider invokes
//! it once, on the first successful resolution, through the
//! [`LogConfigurator`] contract; hosts that own their own subscriber simply
//! register a different configurator (or none).

use std::path::Path;
use std::sync::Arc;

use exhost_domain::error::{Error, Result};
use exhost_domain::ports::{LogConfigurator, LogConfiguratorContract};
use exhost_domain::ServiceInstance;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub use crate::config::LoggingConfig;
use crate::constants::{DEFAULT_LOG_FILE_STEM, LOG_FILTER_ENV};

/// Initialize logging with the provided configuration
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| std::ffi::OsStr::new(DEFAULT_LOG_FILE_STEM)),
        )
    });

    // Layer types differ between JSON and plain output, hence the branches
    let installed = if config.json_format {
        let stdout = fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    } else {
        let stdout = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    };

    installed.map_err(|e| Error::config_with_source("Failed to install logging subscriber", e))?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::config(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &Path, success: bool) {
    if success {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Configuration file not found: {}", config_path.display());
    }
}

/// Default [`LogConfigurator`] installing a `tracing-subscriber` pipeline
#[derive(Debug, Clone, Default)]
pub struct TracingLogConfigurator {
    config: LoggingConfig,
}

impl TracingLogConfigurator {
    /// Create a configurator for the given settings
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Settings this configurator installs
    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Wrap as a service instance for the logging contract
    pub fn into_service(self) -> ServiceInstance {
        let configurator: Arc<dyn LogConfigurator> = Arc::new(self);
        ServiceInstance::of::<LogConfiguratorContract>(configurator)
    }
}

impl LogConfigurator for TracingLogConfigurator {
    fn configure(&self) -> Result<()> {
        init_logging(&self.config)
    }
}
