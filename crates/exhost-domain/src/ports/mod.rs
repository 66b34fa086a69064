//! Port interfaces for the host collaborators
//!
//! | Module | Collaborator |
//! |--------|--------------|
//! | [`composition`] | Host catalog and ambient service lookups |
//! | [`flow`] | Flow factories, flows and their completion channel |
//! | [`window`] | Window surface wrapping a flow |
//! | [`logging`] | Optional logging-configuration service |

pub mod composition;
pub mod flow;
pub mod logging;
pub mod window;

pub use composition::{AmbientServiceSource, CatalogExport, CompositionSource, NullAmbientSource};
pub use flow::{
    flow_channel, ConnectionContext, Flow, FlowFactory, FlowFactoryContract, FlowKind,
    FlowReporter, FlowState, LoadEvent, LoadEvents, OwnedFlow,
};
pub use logging::{LogConfigurator, LogConfiguratorContract};
pub use window::{ClosedHandler, FlowWindow, SubscriptionId, WindowFactory};
