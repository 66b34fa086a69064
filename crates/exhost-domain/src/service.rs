//! Type-erased service instances
//!
//! Every resolution source hands out a [`ServiceInstance`]: the service
//! value itself, erased behind `Any`, plus the optional disposable
//! capability the provider tracks for bulk cleanup.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::contract::Contract;
use crate::error::Result;

/// Capability of releasing resources held by a service
pub trait Disposable: Send + Sync {
    /// Release held resources
    fn dispose(&self) -> Result<()>;
}

/// A resolved service value
#[derive(Clone)]
pub struct ServiceInstance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    disposable: Option<Arc<dyn Disposable>>,
}

impl ServiceInstance {
    /// Wrap an arbitrary service value
    pub fn new<S>(service: S) -> Self
    where
        S: Clone + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(service),
            type_name: std::any::type_name::<S>(),
            disposable: None,
        }
    }

    /// Wrap a service for a specific contract
    pub fn of<C: Contract>(service: C::Service) -> Self {
        Self::new(service)
    }

    /// Attach the disposable capability of the wrapped service
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use exhost_domain::{Disposable, Result, ServiceInstance};
    ///
    /// struct TempFiles;
    ///
    /// impl Disposable for TempFiles {
    ///     fn dispose(&self) -> Result<()> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let files = Arc::new(TempFiles);
    /// let instance = ServiceInstance::new(files.clone()).with_disposable(files);
    /// assert!(instance.disposable().is_some());
    /// ```
    pub fn with_disposable(mut self, disposable: Arc<dyn Disposable>) -> Self {
        self.disposable = Some(disposable);
        self
    }

    /// Down-cast to the requested service type, `None` when it does not match
    pub fn downcast<T>(&self) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.value.downcast_ref::<T>().cloned()
    }

    /// Whether the wrapped value is of type `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Name of the wrapped type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Disposable capability, if the service has one
    pub fn disposable(&self) -> Option<&Arc<dyn Disposable>> {
        self.disposable.as_ref()
    }

    /// Whether two instances wrap the same allocation
    pub fn same_instance(&self, other: &ServiceInstance) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInstance")
            .field("type_name", &self.type_name)
            .field("disposable", &self.disposable.is_some())
            .finish()
    }
}
