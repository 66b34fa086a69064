//! # Infrastructure Layer
//!
//! Service composition and flow lifecycle for the extension composition
//! host, plus the cross-cutting concerns they rely on.
//!
//! ## Module Categories
//!
//! ### Composition & Lifecycle
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Override store, disposal registry, resolver, provider |
//! | [`lifecycle`] | Single active UI flow: setup, run, stop, completion |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based configuration loading |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod lifecycle;
pub mod logging;

// Re-export commonly used types
pub use di::{ServiceProvider, ServiceProviderBuilder};
pub use error_ext::ErrorContext;
pub use lifecycle::FlowLifecycleController;
