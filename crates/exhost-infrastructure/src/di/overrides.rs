//! Override Store
//!
//! Caller-installed, ownership-tagged registrations that shadow every other
//! resolution source. One entry per contract; a new registration evicts the
//! previous one whoever owned it.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use exhost_domain::{ContractId, OwnerId, RegistrationId, ServiceInstance};
use tracing::debug;

/// A single installed override
#[derive(Debug, Clone)]
pub struct OverrideEntry {
    /// Whoever installed the override
    pub owner: OwnerId,
    /// Instance handed out for the contract
    pub instance: ServiceInstance,
    /// Registration handle
    pub registration: RegistrationId,
}

/// Contract-keyed store of overrides
#[derive(Debug)]
pub struct OverrideStore {
    entries: DashMap<ContractId, OverrideEntry>,
    next_registration: AtomicU64,
}

impl OverrideStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_registration: AtomicU64::new(1),
        }
    }

    /// Install `instance` for `contract`, evicting any existing entry
    ///
    /// Eviction ignores the previous owner.
    pub fn add(
        &self,
        contract: ContractId,
        owner: OwnerId,
        instance: ServiceInstance,
    ) -> RegistrationId {
        let registration = RegistrationId(self.next_registration.fetch_add(1, Ordering::Relaxed));
        debug!(contract = %contract, %owner, %registration, "Installing service override");

        let entry = OverrideEntry {
            owner,
            instance,
            registration,
        };
        if let Some(evicted) = self.entries.insert(contract.clone(), entry) {
            debug!(
                contract = %contract,
                owner = %evicted.owner,
                registration = %evicted.registration,
                "Evicted previous service override"
            );
        }
        registration
    }

    /// Instance currently installed for `contract`
    pub fn get(&self, contract: &ContractId) -> Option<ServiceInstance> {
        self.entries
            .get(contract)
            .map(|entry| entry.instance.clone())
    }

    /// Full entry currently installed for `contract`
    pub fn entry(&self, contract: &ContractId) -> Option<OverrideEntry> {
        self.entries.get(contract).map(|entry| entry.value().clone())
    }

    /// Remove the override for `contract`
    ///
    /// With `Some(owner)` the entry is only removed when that owner installed
    /// it; `None` removes unconditionally. Returns whether an entry was
    /// removed.
    pub fn remove(&self, contract: &ContractId, owner: Option<&OwnerId>) -> bool {
        let removed = self
            .entries
            .remove_if(contract, |_, entry| owner.is_none_or(|owner| *owner == entry.owner));

        match removed {
            Some((_, entry)) => {
                debug!(
                    contract = %contract,
                    owner = %entry.owner,
                    registration = %entry.registration,
                    "Removed service override"
                );
                true
            }
            None => false,
        }
    }

    /// Whether an override is installed for `contract`
    pub fn contains(&self, contract: &ContractId) -> bool {
        self.entries.contains_key(contract)
    }

    /// Number of installed overrides
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no override is installed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every override, returning how many were installed
    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}

impl Default for OverrideStore {
    fn default() -> Self {
        Self::new()
    }
}
