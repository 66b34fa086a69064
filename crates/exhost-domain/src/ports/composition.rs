//! Composition Source Ports
//!
//! The host populates a catalog of exported services before the provider is
//! built. The provider only ever asks two questions of it: "which exports
//! match this contract" and "does the ambient environment know this
//! contract".

use crate::contract::ContractId;
use crate::service::ServiceInstance;

/// A service exported into the host catalog
#[derive(Debug, Clone)]
pub struct CatalogExport {
    /// Exported service
    pub instance: ServiceInstance,
    /// Version of the build that defined the export
    pub build_version: String,
}

impl CatalogExport {
    /// Create an export defined by the given build version
    pub fn new(instance: ServiceInstance, build_version: impl Into<String>) -> Self {
        Self {
            instance,
            build_version: build_version.into(),
        }
    }
}

/// Host-supplied catalog of exported services
///
/// # Example
///
/// ```
/// use exhost_domain::ports::{CatalogExport, CompositionSource};
/// use exhost_domain::ContractId;
///
/// struct EmptyCatalog;
///
/// impl CompositionSource for EmptyCatalog {
///     fn exports(&self, _contract: &ContractId) -> Vec<CatalogExport> {
///         Vec::new()
///     }
/// }
///
/// assert!(EmptyCatalog.exports(&ContractId::new("acme.Missing")).is_empty());
/// ```
pub trait CompositionSource: Send + Sync {
    /// All exports registered for the contract, in catalog order
    fn exports(&self, contract: &ContractId) -> Vec<CatalogExport>;
}

/// Fallback service lookup provided by the hosting environment
pub trait AmbientServiceSource: Send + Sync {
    /// Look up a single service for the contract
    fn get_service(&self, contract: &ContractId) -> Option<ServiceInstance>;
}

/// Ambient source that never knows any service
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAmbientSource;

impl AmbientServiceSource for NullAmbientSource {
    fn get_service(&self, _contract: &ContractId) -> Option<ServiceInstance> {
        None
    }
}
