//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `exhost_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "exhost.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "exhost";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "EXHOST";

/// Separator between nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "EXHOST_LOG";

/// Default log file stem when writing to a directory
pub const DEFAULT_LOG_FILE_STEM: &str = "exhost";
