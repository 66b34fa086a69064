//! Service composition
//!
//! ## Architecture
//!
//! ```text
//! ServiceProvider (composition root)
//! ├── OverrideStore       caller-installed, owner-tagged overrides
//! ├── DisposalRegistry    disposables handed out during resolution
//! ├── ServiceResolver     override → catalog → ambient → secondary
//! └── FlowLifecycleController
//! ```
//!
//! All state is owned by one provider instance; nothing is global.

pub mod bootstrap;
pub mod disposal;
pub mod overrides;
pub mod provider;
pub mod resolver;

pub use bootstrap::ServiceProviderBuilder;
pub use disposal::{DisposalRegistry, DisposalReport};
pub use overrides::{OverrideEntry, OverrideStore};
pub use provider::{OverrideGuard, ServiceProvider, TeardownReport};
pub use resolver::ServiceResolver;
