//! Contract identities and ownership tokens
//!
//! Services are looked up by a logical contract rather than by their
//! concrete type. Each contract is a marker type implementing [`Contract`],
//! which pins down a stable name and the shape of the service handed out
//! for it (usually an `Arc<dyn Trait>`).
//!
//! ```
//! use std::sync::Arc;
//! use exhost_domain::contract::{Contract, ContractId};
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! pub struct GreeterContract;
//!
//! impl Contract for GreeterContract {
//!     type Service = Arc<dyn Greeter>;
//!     const NAME: &'static str = "acme.greeting.Greeter";
//! }
//!
//! assert_eq!(ContractId::of::<GreeterContract>().as_str(), "acme.greeting.Greeter");
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Logical service contract known at compile time
pub trait Contract: 'static {
    /// Service handle returned when the contract is resolved
    type Service: Clone + Send + Sync + 'static;

    /// Stable, namespaced contract name
    const NAME: &'static str;
}

/// Canonical key identifying a service contract
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(Arc<str>);

impl ContractId {
    /// Create a contract id from a raw name
    ///
    /// Surrounding whitespace is not part of the identity.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref().trim()))
    }

    /// Contract id of a contract marker type
    pub fn of<C: Contract>() -> Self {
        Self::new(C::NAME)
    }

    /// Canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this contract lives in the given dotted namespace
    ///
    /// `acme.flow.Factory` is inside `acme` and `acme.flow` but not `acm`.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        let namespace = namespace.trim().trim_end_matches('.');
        if namespace.is_empty() {
            return false;
        }
        match self.0.strip_prefix(namespace) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self.0)
    }
}

impl From<&str> for ContractId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContractId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Opaque token identifying whoever installed an override
///
/// Owners are compared by identity only; two calls to [`OwnerId::new`]
/// never produce equal tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocate a fresh owner token
    pub fn new() -> Self {
        Self(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Handle of a single override registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration#{}", self.0)
    }
}
