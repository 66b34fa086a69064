//! Service resolution configuration types

use exhost_domain::constants::{EXTENSION_NAMESPACE, RUNNING_BUILD_VERSION};
use serde::{Deserialize, Serialize};

/// Service resolution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Contract namespace owned by this extension
    ///
    /// Catalog exports for contracts in this namespace must be defined by
    /// the running build version.
    pub namespace: String,

    /// Build version of the running extension
    pub running_version: String,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            namespace: EXTENSION_NAMESPACE.to_string(),
            running_version: RUNNING_BUILD_VERSION.to_string(),
        }
    }
}
