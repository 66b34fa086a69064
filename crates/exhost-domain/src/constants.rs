//! Domain constants

/// Namespace owned by this extension; catalog exports for contracts inside
/// it must come from the running build
pub const EXTENSION_NAMESPACE: &str = "exhost";

/// Version of the running build
pub const RUNNING_BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");
