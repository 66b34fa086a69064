//! Configuration types

mod app;
mod composition;
mod lifecycle;
mod logging;

pub use app::AppConfig;
pub use composition::CompositionConfig;
pub use lifecycle::LifecycleConfig;
pub use logging::LoggingConfig;
