//! Provider bootstrap
//!
//! Wires the composition root from host collaborators:
//!
//! ```text
//! host composition ──┐
//! ambient sources ───┼──▶ ServiceProviderBuilder::build() ──▶ ServiceProvider
//! window factory ────┤        │
//! AppConfig ─────────┘        ├─ OverrideStore
//!                             ├─ DisposalRegistry
//!                             ├─ ServiceResolver
//!                             └─ FlowLifecycleController
//! ```
//!
//! A composition source that could not be obtained does not fail the build:
//! the provider comes up uninitialized and degrades every operation.
//!
//! ## Usage
//!
//! ```ignore
//! let provider = ServiceProvider::builder(window_factory)
//!     .with_config(ConfigLoader::new().load()?)
//!     .with_composition_result(host.composition())
//!     .with_ambient_source(host.services())
//!     .with_default_logging()
//!     .build();
//! ```

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use exhost_domain::error::Result;
use exhost_domain::ports::{
    AmbientServiceSource, CompositionSource, LogConfigurator, NullAmbientSource, WindowFactory,
};
use tracing::{error, info};

use crate::config::{AppConfig, ConfigLoader};
use crate::di::disposal::DisposalRegistry;
use crate::di::overrides::OverrideStore;
use crate::di::provider::ServiceProvider;
use crate::di::resolver::ServiceResolver;
use crate::lifecycle::FlowLifecycleController;
use crate::logging::TracingLogConfigurator;

/// Builder for [`ServiceProvider`]
pub struct ServiceProviderBuilder {
    config: AppConfig,
    composition: Option<Result<Arc<dyn CompositionSource>>>,
    ambient: Option<Arc<dyn AmbientServiceSource>>,
    secondary: Option<Arc<dyn AmbientServiceSource>>,
    window_factory: Arc<dyn WindowFactory>,
    fallback_logging: Option<Arc<dyn LogConfigurator>>,
    default_logging: bool,
}

impl ServiceProviderBuilder {
    /// Create a builder with default configuration and no sources
    pub fn new(window_factory: Arc<dyn WindowFactory>) -> Self {
        Self {
            config: AppConfig::default(),
            composition: None,
            ambient: None,
            secondary: None,
            window_factory,
            fallback_logging: None,
            default_logging: false,
        }
    }

    /// Use the given configuration
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration through `loader`
    pub fn with_config_loader(self, loader: &ConfigLoader) -> Result<Self> {
        let config = loader.load()?;
        Ok(self.with_config(config))
    }

    /// Use an already obtained composition source
    pub fn with_composition(mut self, composition: Arc<dyn CompositionSource>) -> Self {
        self.composition = Some(Ok(composition));
        self
    }

    /// Use the outcome of obtaining the composition source
    ///
    /// An `Err` leaves the built provider uninitialized.
    pub fn with_composition_result(
        mut self,
        composition: Result<Arc<dyn CompositionSource>>,
    ) -> Self {
        self.composition = Some(composition);
        self
    }

    /// Primary ambient service source
    pub fn with_ambient_source(mut self, source: Arc<dyn AmbientServiceSource>) -> Self {
        self.ambient = Some(source);
        self
    }

    /// Secondary ambient service source, consulted last
    pub fn with_secondary_source(mut self, source: Arc<dyn AmbientServiceSource>) -> Self {
        self.secondary = Some(source);
        self
    }

    /// Logging configurator used when no source provides one
    pub fn with_fallback_logging(mut self, configurator: Arc<dyn LogConfigurator>) -> Self {
        self.fallback_logging = Some(configurator);
        self
    }

    /// Fall back to [`TracingLogConfigurator`] with the configured settings
    pub fn with_default_logging(mut self) -> Self {
        self.default_logging = true;
        self
    }

    /// Build the provider
    pub fn build(self) -> ServiceProvider {
        let overrides = Arc::new(OverrideStore::new());
        let disposables = Arc::new(DisposalRegistry::new());
        let controller = FlowLifecycleController::new(self.window_factory, &self.config.lifecycle);

        let fallback_logging = self.fallback_logging.or_else(|| {
            self.default_logging.then(|| {
                Arc::new(TracingLogConfigurator::new(self.config.logging.clone()))
                    as Arc<dyn LogConfigurator>
            })
        });

        let (resolver, initialization_error) = match self.composition {
            Some(Ok(composition)) => {
                let ambient = self
                    .ambient
                    .unwrap_or_else(|| Arc::new(NullAmbientSource));
                let mut resolver = ServiceResolver::new(
                    composition,
                    ambient,
                    overrides.clone(),
                    disposables.clone(),
                    self.config.composition.clone(),
                );
                if let Some(configurator) = fallback_logging {
                    resolver = resolver.with_fallback_logging(configurator);
                }
                resolver.set_secondary_source(self.secondary);
                info!(
                    namespace = %self.config.composition.namespace,
                    running_version = %self.config.composition.running_version,
                    "Service provider initialized"
                );
                (Some(resolver), None)
            }
            Some(Err(e)) => {
                error!(error = %e, "Composition source unavailable, service provider disabled");
                (None, Some(e.to_string()))
            }
            None => {
                let cause = "no composition source configured".to_string();
                error!(error = %cause, "Composition source unavailable, service provider disabled");
                (None, Some(cause))
            }
        };

        ServiceProvider {
            config: self.config,
            resolver,
            initialization_error,
            overrides,
            disposables,
            controller,
            disposed: AtomicBool::new(false),
        }
    }
}
