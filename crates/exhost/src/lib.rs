//! # Extension Composition Host
//!
//! Composition root and UI flow lifecycle for an extension embedded in a
//! host application.
//!
//! This crate is the public facade: it re-exports the domain contracts and
//! the infrastructure that wires them together.
//!
//! ## Example
//!
//! ```ignore
//! use exhost::prelude::*;
//!
//! let provider = ServiceProvider::builder(window_factory)
//!     .with_config(ConfigLoader::new().load()?)
//!     .with_composition_result(host.composition())
//!     .with_ambient_source(host.services())
//!     .with_default_logging()
//!     .build();
//!
//! let events = provider.setup_ui(&FlowKind::new("connect"), None);
//! provider.run_ui();
//! ```
//!
//! ## Architecture
//!
//! - `domain` - contracts, errors and the ports the host implements
//! - `infrastructure` - override store, resolver, flow lifecycle, config, logging

/// Domain layer - contracts, errors and host ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use exhost_domain::*;
}

/// Infrastructure layer - provider, lifecycle, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use exhost_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

pub use infrastructure::{ServiceProvider, ServiceProviderBuilder};

/// Everything an embedding host typically needs
pub mod prelude {
    pub use exhost_domain::ports::{
        AmbientServiceSource, CatalogExport, ClosedHandler, CompositionSource, ConnectionContext,
        Flow, FlowFactory, FlowFactoryContract, FlowKind, FlowReporter, FlowState, FlowWindow,
        LoadEvent, LoadEvents, LogConfigurator, LogConfiguratorContract, OwnedFlow,
        SubscriptionId, WindowFactory,
    };
    pub use exhost_domain::{
        Contract, ContractId, Disposable, Error, OwnerId, RegistrationId, Result, ServiceInstance,
    };
    pub use exhost_infrastructure::config::{AppConfig, ConfigLoader};
    pub use exhost_infrastructure::di::{OverrideGuard, TeardownReport};
    pub use exhost_infrastructure::{ServiceProvider, ServiceProviderBuilder};
}
