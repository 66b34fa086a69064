//! Window Ports
//!
//! The concrete windowing lives in the host. A window wraps one flow's
//! visual surface and reports when the user dismisses it.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::ports::flow::Flow;

/// Callback fired when the user dismisses a window
pub type ClosedHandler = Arc<dyn Fn() + Send + Sync>;

/// Registration of a [`ClosedHandler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription#{}", self.0)
    }
}

/// Visual surface of a flow
pub trait FlowWindow: Send + Sync {
    /// Show the window without blocking
    fn show(&self) -> Result<()>;

    /// Show the window modally, blocking until it is dismissed
    fn show_modal(&self) -> Result<()>;

    /// Close the window programmatically
    ///
    /// Programmatic closes do not fire closed handlers.
    fn close(&self) -> Result<()>;

    /// Register a handler for user dismissal
    fn subscribe_closed(&self, handler: ClosedHandler) -> SubscriptionId;

    /// Remove a handler; unknown ids are ignored
    fn unsubscribe_closed(&self, id: SubscriptionId);
}

/// Creates windows around flows
pub trait WindowFactory: Send + Sync {
    /// Wrap the flow in a new, not yet shown, window
    fn create_window(&self, flow: Arc<dyn Flow>) -> Result<Arc<dyn FlowWindow>>;
}
