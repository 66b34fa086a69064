//! Service Provider
//!
//! The process-scoped composition root. Owns the override store, the
//! disposal registry, the resolver and the flow lifecycle controller, and
//! tears all of them down exactly once.
//!
//! Every operation is fail-soft: only [`Error::Resolution`] from the
//! mandatory `resolve*` methods reaches the caller as an `Err`. Anything
//! else is logged and replaced by a harmless default.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use exhost_domain::error::{Error, Result};
use exhost_domain::ports::{
    AmbientServiceSource, ConnectionContext, FlowKind, FlowState, LoadEvents,
};
use exhost_domain::{Contract, ContractId, OwnerId, RegistrationId, ServiceInstance};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::di::bootstrap::ServiceProviderBuilder;
use crate::di::disposal::{DisposalRegistry, DisposalReport};
use crate::di::overrides::OverrideStore;
use crate::di::resolver::ServiceResolver;
use crate::lifecycle::{FlowId, FlowLifecycleController};

/// Outcome of provider teardown
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Whether an active flow was stopped
    pub flow_stopped: bool,
    /// Failures of the active flow's stop or lifetime release
    pub flow_failures: Vec<Error>,
    /// Release outcome of tracked disposables
    pub disposables: DisposalReport,
    /// Number of overrides dropped
    pub overrides_cleared: usize,
}

impl TeardownReport {
    /// Whether every step completed without failures
    pub fn is_clean(&self) -> bool {
        self.flow_failures.is_empty() && self.disposables.is_clean()
    }
}

/// Removes its override when dropped
///
/// Removal is owner-checked: if someone else replaced the override in the
/// meantime, their registration is left alone.
#[derive(Debug)]
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct OverrideGuard {
    store: Arc<OverrideStore>,
    contract: ContractId,
    owner: OwnerId,
    registration: RegistrationId,
}

impl OverrideGuard {
    /// Overridden contract
    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    /// Owner token the override was installed with
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Registration handle of the override
    pub fn registration(&self) -> RegistrationId {
        self.registration
    }
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        self.store.remove(&self.contract, Some(&self.owner));
    }
}

/// Composition root of the extension
pub struct ServiceProvider {
    pub(crate) config: AppConfig,
    pub(crate) resolver: Option<ServiceResolver>,
    pub(crate) initialization_error: Option<String>,
    pub(crate) overrides: Arc<OverrideStore>,
    pub(crate) disposables: Arc<DisposalRegistry>,
    pub(crate) controller: FlowLifecycleController,
    pub(crate) disposed: AtomicBool,
}

impl ServiceProvider {
    /// Start building a provider that wraps flows in windows from `window_factory`
    pub fn builder(
        window_factory: Arc<dyn exhost_domain::ports::WindowFactory>,
    ) -> ServiceProviderBuilder {
        ServiceProviderBuilder::new(window_factory)
    }

    /// Configuration the provider was built with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether the composition source was obtained at construction
    pub fn is_initialized(&self) -> bool {
        self.resolver.is_some()
    }

    /// Why construction failed, if it did
    pub fn initialization_error(&self) -> Option<&str> {
        self.initialization_error.as_deref()
    }

    /// Whether the provider has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn resolver(&self, operation: &'static str) -> Option<&ServiceResolver> {
        if self.is_disposed() {
            debug!(operation, "Service provider is disposed");
            return None;
        }
        if self.resolver.is_none() {
            debug!(
                operation,
                cause = self.initialization_error.as_deref().unwrap_or("unknown"),
                "Service provider is not initialized"
            );
        }
        self.resolver.as_ref()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve `contract`, or `None` when no source provides it
    pub fn try_resolve_id(&self, contract: &ContractId) -> Option<ServiceInstance> {
        self.resolver("try_resolve")?.try_resolve_id(contract)
    }

    /// Resolve `contract`, failing with [`Error::Resolution`] when absent
    pub fn resolve_id(&self, contract: &ContractId) -> Result<ServiceInstance> {
        self.try_resolve_id(contract)
            .ok_or_else(|| Error::resolution(contract.clone()))
    }

    /// Resolve a contract to its service type
    pub fn try_resolve<C: Contract>(&self) -> Option<C::Service> {
        self.resolver("try_resolve")?.try_resolve::<C>()
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

    /// Replace (or clear) the secondary ambient service source
    pub fn set_secondary_source(&self, source: Option<Arc<dyn AmbientServiceSource>>) {
        if let Some(resolver) = self.resolver("set_secondary_source") {
            resolver.set_secondary_source(source);
        }
    }

    // ========================================================================
    // Overrides
    // ========================================================================

    /// Install `service` as the highest-priority source for contract `C`
    pub fn add_override<C: Contract>(
        &self,
        owner: OwnerId,
        service: C::Service,
    ) -> Option<RegistrationId> {
        self.add_override_instance(ContractId::of::<C>(), owner, ServiceInstance::of::<C>(service))
    }

    /// Install an instance as the highest-priority source for `contract`
    ///
    /// Any existing override for the contract is evicted, whoever owns it.
    pub fn add_override_instance(
        &self,
        contract: ContractId,
        owner: OwnerId,
        instance: ServiceInstance,
    ) -> Option<RegistrationId> {
        self.resolver("add_override")?;
        Some(self.overrides.add(contract, owner, instance))
    }

    /// Remove the override for contract `C`
    ///
    /// `Some(owner)` only removes an override installed by that owner;
    /// `None` removes unconditionally.
    pub fn remove_override<C: Contract>(&self, owner: Option<&OwnerId>) -> bool {
        self.remove_override_id(&ContractId::of::<C>(), owner)
    }

    /// Remove the override for `contract`
    pub fn remove_override_id(&self, contract: &ContractId, owner: Option<&OwnerId>) -> bool {
        if self.resolver("remove_override").is_none() {
            return false;
        }
        self.overrides.remove(contract, owner)
    }

    /// Install an override removed again when the returned guard drops
    pub fn scoped_override<C: Contract>(&self, service: C::Service) -> Option<OverrideGuard> {
        let owner = OwnerId::new();
        let registration = self.add_override::<C>(owner, service)?;
        Some(OverrideGuard {
            store: self.overrides.clone(),
            contract: ContractId::of::<C>(),
            owner,
            registration,
        })
    }

    /// Whether an override is installed for `contract`
    pub fn has_override(&self, contract: &ContractId) -> bool {
        self.overrides.contains(contract)
    }

    // ========================================================================
    // Flow lifecycle
    // ========================================================================

    /// Replace the active flow with a new flow of `kind`
    ///
    /// Returns the flow's lazy load events; on an uninitialized provider an
    /// empty, already-complete stream.
    pub fn setup_ui(&self, kind: &FlowKind, connection: Option<ConnectionContext>) -> LoadEvents {
        match self.resolver("setup_ui") {
            Some(resolver) => self.controller.setup_ui(resolver, kind, connection),
            None => {
                error!(kind = %kind, "Cannot set up a flow: service provider is unavailable");
                stream::empty().boxed()
            }
        }
    }

    /// Show the active flow modally, blocking until its window is dismissed
    pub fn run_ui(&self) {
        if self.resolver("run_ui").is_none() {
            error!("Cannot run a flow: service provider is unavailable");
            return;
        }
        self.controller.run_ui();
    }

    /// Set up a flow of `kind` and show it modally
    pub fn run_ui_with(&self, kind: &FlowKind, connection: Option<ConnectionContext>) {
        match self.resolver("run_ui") {
            Some(resolver) => self.controller.run_ui_with(resolver, kind, connection),
            None => error!(kind = %kind, "Cannot run a flow: service provider is unavailable"),
        }
    }

    /// Show the active flow without blocking
    pub fn show_ui(&self) {
        if self.resolver("show_ui").is_none() {
            error!("Cannot show a flow: service provider is unavailable");
            return;
        }
        self.controller.show_ui();
    }

    /// Stop and dispose the active flow, if any
    pub fn stop_ui(&self) -> bool {
        self.controller.stop_ui()
    }

    /// Completion-state updates of the active flow
    pub fn listen_to_completion_state(&self) -> BoxStream<'static, bool> {
        if self.resolver("listen_to_completion_state").is_none() {
            error!("Cannot listen to flow completion: service provider is unavailable");
            return stream::iter([false]).boxed();
        }
        self.controller.listen_to_completion_state()
    }

    /// State of the active flow slot
    pub fn flow_state(&self) -> FlowState {
        self.controller.flow_state()
    }

    /// Identifier of the active flow
    pub fn active_flow_id(&self) -> Option<FlowId> {
        self.controller.active_flow_id()
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Stop the active flow, release tracked disposables and drop overrides
    ///
    /// Every step runs even if an earlier one failed. Returns `None` when
    /// the provider was already disposed.
    pub fn dispose(&self) -> Option<TeardownReport> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return None;
        }
        info!("Disposing service provider");

        let flow_failures = self.controller.stop_active();
        let flow_stopped = flow_failures.is_some();
        let disposables = self.disposables.release_all();
        let overrides_cleared = self.overrides.clear();

        let report = TeardownReport {
            flow_stopped,
            flow_failures: flow_failures.unwrap_or_default(),
            disposables,
            overrides_cleared,
        };
        if report.is_clean() {
            info!(
                flow_stopped,
                released = report.disposables.released,
                overrides_cleared,
                "Service provider disposed"
            );
        } else {
            warn!(
                flow_failed = report.flow_failures.len(),
                failed = report.disposables.failures.len(),
                "Service provider disposed with failures"
            );
        }
        Some(report)
    }
}

impl Drop for ServiceProvider {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("initialized", &self.is_initialized())
            .field("disposed", &self.is_disposed())
            .field("resolver", &self.resolver)
            .field("controller", &self.controller)
            .finish()
    }
}
