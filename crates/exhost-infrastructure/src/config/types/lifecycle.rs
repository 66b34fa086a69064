//! Flow lifecycle configuration types

use serde::{Deserialize, Serialize};

/// Flow lifecycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Panic instead of logging when an operation needs an active flow and
    /// none exists
    ///
    /// Defaults to on in debug builds.
    pub strict_lifecycle: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            strict_lifecycle: cfg!(debug_assertions),
        }
    }
}
