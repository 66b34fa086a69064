//! Root application configuration

use serde::{Deserialize, Serialize};

use super::{CompositionConfig, LifecycleConfig, LoggingConfig};

/// Root configuration of the composition host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service resolution settings
    pub composition: CompositionConfig,
    /// Flow lifecycle settings
    pub lifecycle: LifecycleConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}
