//! Service Resolver
//!
//! Answers "give me an instance for contract C" by walking the resolution
//! sources in a fixed order:
//!
//! ```text
//! ┌──────────────────┐   hit
//! │  OverrideStore   │────────▶ track disposable ─▶ return
//! └────────┬─────────┘
//!          │ miss
//!          ▼
//! ┌──────────────────┐   own namespace: build version must match
//! │  Host catalog    │────────▶ track disposable ─▶ return
//! └────────┬─────────┘
//!          │ miss
//!          ▼
//! ┌──────────────────┐
//! │ Primary ambient  │────────▶ return
//! └────────┬─────────┘
//!          │ miss
//!          ▼
//! ┌──────────────────┐
//! │Secondary ambient │────────▶ return / None
//! └──────────────────┘
//! ```
//!
//! The first successful resolution also triggers the one-time logging
//! configuration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use exhost_domain::error::{Error, Result};
use exhost_domain::ports::{
    AmbientServiceSource, CompositionSource, LogConfigurator, LogConfiguratorContract,
};
use exhost_domain::{Contract, ContractId, ServiceInstance};
use tracing::{debug, trace, warn};

use crate::config::CompositionConfig;
use crate::di::disposal::DisposalRegistry;
use crate::di::overrides::OverrideStore;

/// Where a resolved instance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolutionSource {
    /// Caller-installed override
    Override,
    /// Host catalog export
    Catalog,
    /// Primary ambient service lookup
    PrimaryAmbient,
    /// Secondary ambient service lookup
    SecondaryAmbient,
}

struct SecondarySource(Arc<dyn AmbientServiceSource>);

/// Multi-source service resolver
pub struct ServiceResolver {
    composition: Arc<dyn CompositionSource>,
    ambient: Arc<dyn AmbientServiceSource>,
    secondary: ArcSwapOption<SecondarySource>,
    overrides: Arc<OverrideStore>,
    disposables: Arc<DisposalRegistry>,
    config: CompositionConfig,
    fallback_logging: Option<Arc<dyn LogConfigurator>>,
    logging_configured: AtomicBool,
}

impl ServiceResolver {
    /// Create a resolver over the given sources
    pub fn new(
        composition: Arc<dyn CompositionSource>,
        ambient: Arc<dyn AmbientServiceSource>,
        overrides: Arc<OverrideStore>,
        disposables: Arc<DisposalRegistry>,
        config: CompositionConfig,
    ) -> Self {
        Self {
            composition,
            ambient,
            secondary: ArcSwapOption::empty(),
            overrides,
            disposables,
            config,
            fallback_logging: None,
            logging_configured: AtomicBool::new(false),
        }
    }

    /// Logging configurator used when no source provides one
    pub fn with_fallback_logging(mut self, configurator: Arc<dyn LogConfigurator>) -> Self {
        self.fallback_logging = Some(configurator);
        self
    }

    /// Replace (or clear) the secondary ambient source
    pub fn set_secondary_source(&self, source: Option<Arc<dyn AmbientServiceSource>>) {
        self.secondary
            .store(source.map(|source| Arc::new(SecondarySource(source))));
    }

    /// Whether a secondary ambient source is configured
    pub fn has_secondary_source(&self) -> bool {
        self.secondary.load().is_some()
    }

    /// Resolve `contract`, or `None` when no source provides it
    pub fn try_resolve_id(&self, contract: &ContractId) -> Option<ServiceInstance> {
        let (instance, source) = self.lookup(contract)?;
        trace!(contract = %contract, ?source, service = instance.type_name(), "Resolved service");
        self.configure_logging_once();
        Some(instance)
    }

    /// Resolve `contract`, failing with [`Error::Resolution`] when absent
    pub fn resolve_id(&self, contract: &ContractId) -> Result<ServiceInstance> {
        self.try_resolve_id(contract).ok_or_else(|| {
            debug!(contract = %contract, "No source provides contract");
            Error::resolution(contract.clone())
        })
    }

    /// Resolve a contract to its service type
    ///
    /// An instance registered under the contract with a different type is
    /// treated as absent.
    pub fn try_resolve<C: Contract>(&self) -> Option<C::Service> {
        let contract = ContractId::of::<C>();
        let instance = self.try_resolve_id(&contract)?;
        let service = instance.downcast::<C::Service>();
        if service.is_none() {
            warn!(
                contract = %contract,
                found = instance.type_name(),
                expected = std::any::type_name::<C::Service>(),
                "Resolved instance does not match the contract service type"
            );
        }
        service
    }

    /// Resolve a contract to its service type, failing when absent
    pub fn resolve<C: Contract>(&self) -> Result<C::Service> {
        self.try_resolve::<C>()
            .ok_or_else(|| Error::resolution(ContractId::of::<C>()))
    }

    /// Resolve a contract and down-cast the instance to `T`
    ///
    /// Fails only when the contract is absent; a failed cast yields `None`.
    pub fn resolve_as<C, T>(&self) -> Result<Option<T>>
    where
        C: Contract,
        T: Clone + 'static,
    {
        Ok(self.resolve_id(&ContractId::of::<C>())?.downcast::<T>())
    }

    fn lookup(&self, contract: &ContractId) -> Option<(ServiceInstance, ResolutionSource)> {
        if let Some(instance) = self.overrides.get(contract) {
            self.track(contract, &instance);
            return Some((instance, ResolutionSource::Override));
        }

        if let Some(instance) = self.from_catalog(contract) {
            self.track(contract, &instance);
            return Some((instance, ResolutionSource::Catalog));
        }

        if let Some(instance) = self.ambient.get_service(contract) {
            return Some((instance, ResolutionSource::PrimaryAmbient));
        }

        let secondary = self.secondary.load_full()?;
        secondary
            .0
            .get_service(contract)
            .map(|instance| (instance, ResolutionSource::SecondaryAmbient))
    }

    fn from_catalog(&self, contract: &ContractId) -> Option<ServiceInstance> {
        let exports = self.composition.exports(contract);
        if !contract.in_namespace(&self.config.namespace) {
            return exports.into_iter().next().map(|export| export.instance);
        }

        let running = self.config.running_version.trim();
        exports
            .into_iter()
            .find(|export| {
                let matches = export.build_version.trim() == running;
                if !matches {
                    debug!(
                        contract = %contract,
                        export_version = %export.build_version,
                        running_version = %running,
                        "Skipping catalog export from a different build"
                    );
                }
                matches
            })
            .map(|export| export.instance)
    }

    fn track(&self, contract: &ContractId, instance: &ServiceInstance) {
        if let Some(disposable) = instance.disposable() {
            if self.disposables.track(disposable) {
                trace!(contract = %contract, "Tracking disposable service");
            }
        }
    }

    fn configure_logging_once(&self) {
        if self.logging_configured.swap(true, Ordering::SeqCst) {
            return;
        }

        let configurator = self
            .lookup(&ContractId::of::<LogConfiguratorContract>())
            .and_then(|(instance, _)| {
                instance.downcast::<<LogConfiguratorContract as Contract>::Service>()
            })
            .or_else(|| self.fallback_logging.clone());

        if let Some(configurator) = configurator {
            if let Err(e) = configurator.configure() {
                warn!(error = %e, "Logging configuration failed, continuing without it");
            }
        }
    }
}

impl std::fmt::Debug for ServiceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceResolver")
            .field("namespace", &self.config.namespace)
            .field("running_version", &self.config.running_version)
            .field("overrides", &self.overrides.len())
            .field("secondary", &self.has_secondary_source())
            .finish()
    }
}
