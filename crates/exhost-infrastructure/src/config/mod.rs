//! Configuration management
//!
//! Figment-based configuration: defaults, an optional TOML file, then
//! `EXHOST__`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
