//! Logging configuration port

use std::sync::Arc;

use crate::contract::Contract;
use crate::error::Result;

/// Service that sets up logging for the extension
///
/// Invoked at most once, on the first successful resolution after the
/// provider is built.
pub trait LogConfigurator: Send + Sync {
    /// Install the logging pipeline
    fn configure(&self) -> Result<()>;
}

/// Contract for [`LogConfigurator`]
pub struct LogConfiguratorContract;

impl Contract for LogConfiguratorContract {
    type Service = Arc<dyn LogConfigurator>;
    const NAME: &'static str = "exhost.logging.LogConfigurator";
}
