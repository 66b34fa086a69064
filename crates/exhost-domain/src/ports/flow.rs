//! Flow Ports
//!
//! A flow is one self-contained unit of UI work. The provider obtains flows
//! from a [`FlowFactory`] resolved through the service catalog and drives
//! them through a single lifecycle:
//!
//! ```text
//!   Idle ──setup──▶ Starting ──start──▶ Running ──complete──▶ Completing ──▶ Idle
//!                      │                   │
//!                      └──────stop─────────┴──────▶ Stopping ──────────────▶ Idle
//! ```
//!
//! Completion travels through a one-shot [`FlowReporter`]. The provider
//! opens the channel with its completion hook already attached and only
//! then hands the reporter to the flow, so a flow can never complete before
//! someone is listening.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::contract::Contract;
use crate::error::Result;
use crate::service::Disposable;

/// Stream of load-progress events produced while a flow is set up
pub type LoadEvents = BoxStream<'static, LoadEvent>;

/// Lifecycle state of the active flow slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlowState {
    /// No active flow
    #[default]
    Idle,
    /// Flow created and wrapped in a window, not started yet
    Starting,
    /// Flow started
    Running,
    /// Flow signalled completion and is being torn down
    Completing,
    /// Flow is being stopped explicitly or by the user
    Stopping,
}

/// Which flow a factory-created controller should run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowKind(String);

impl FlowKind {
    /// Create a flow kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Kind name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlowKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Connection context a flow may be started against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionContext {
    /// Connection identifier
    pub id: String,
    /// Additional connection properties
    pub properties: BTreeMap<String, String>,
}

impl ConnectionContext {
    /// Create a context for the given connection id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// One step of flow loading progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadEvent {
    /// Stage name
    pub stage: String,
    /// Optional human-readable detail
    pub message: Option<String>,
    /// Optional completion ratio in `0.0..=1.0`
    pub progress: Option<f32>,
}

impl LoadEvent {
    /// Event for a named stage
    pub fn stage(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: None,
            progress: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a progress ratio, clamped to `0.0..=1.0`
    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = Some(progress.clamp(0.0, 1.0));
        self
    }
}

type CompletionHook = Box<dyn FnOnce() + Send>;

/// Sending half of a flow channel
///
/// Completes exactly once: either through [`FlowReporter::complete`] or when
/// dropped. Completion ends the event stream and fires the hook the channel
/// was opened with.
pub struct FlowReporter {
    sender: Option<UnboundedSender<LoadEvent>>,
    on_complete: Option<CompletionHook>,
}

impl FlowReporter {
    /// Publish a progress event
    ///
    /// Returns `false` when nobody is listening to the stream anymore.
    pub fn progress(&self, event: LoadEvent) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|sender| sender.unbounded_send(event).is_ok())
    }

    /// Signal that the flow has finished
    pub fn complete(self) {
        drop(self);
    }

    fn finish(&mut self) {
        self.sender.take();
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}

impl Drop for FlowReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

impl fmt::Debug for FlowReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowReporter")
            .field("open", &self.sender.is_some())
            .finish()
    }
}

/// Open a flow channel whose completion fires `on_complete`
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use exhost_domain::ports::{flow_channel, LoadEvent};
///
/// let done = Arc::new(AtomicBool::new(false));
/// let flag = done.clone();
/// let (reporter, _events) = flow_channel(move || flag.store(true, Ordering::SeqCst));
///
/// reporter.progress(LoadEvent::stage("connect"));
/// reporter.complete();
/// assert!(done.load(Ordering::SeqCst));
/// ```
pub fn flow_channel<F>(on_complete: F) -> (FlowReporter, LoadEvents)
where
    F: FnOnce() + Send + 'static,
{
    let (sender, receiver) = mpsc::unbounded();
    let reporter = FlowReporter {
        sender: Some(sender),
        on_complete: Some(Box::new(on_complete)),
    };
    (reporter, receiver.boxed())
}

/// A running unit of UI work
pub trait Flow: Send + Sync {
    /// Prepare the flow for `kind`, keeping `reporter` until it finishes
    fn select(&self, kind: &FlowKind, reporter: FlowReporter) -> Result<()>;

    /// Start executing, optionally against a connection
    fn start(&self, connection: Option<ConnectionContext>) -> Result<()>;

    /// Whether the flow has already stopped
    fn is_stopped(&self) -> bool;

    /// Ask the flow to stop
    fn stop(&self) -> Result<()>;

    /// Stream of completion-state updates
    fn completion_state(&self) -> BoxStream<'static, bool>;
}

/// A flow together with the scope owning its dependencies
pub struct OwnedFlow {
    /// The flow
    pub flow: Arc<dyn Flow>,
    /// Scope released after the flow stops
    pub lifetime: Option<Arc<dyn Disposable>>,
}

impl OwnedFlow {
    /// Flow without a dedicated lifetime scope
    pub fn new(flow: Arc<dyn Flow>) -> Self {
        Self {
            flow,
            lifetime: None,
        }
    }

    /// Attach the scope released after the flow stops
    pub fn with_lifetime(mut self, lifetime: Arc<dyn Disposable>) -> Self {
        self.lifetime = Some(lifetime);
        self
    }
}

impl fmt::Debug for OwnedFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedFlow")
            .field("lifetime", &self.lifetime.is_some())
            .finish()
    }
}

/// Creates flows on demand
pub trait FlowFactory: Send + Sync {
    /// Create a new, owned flow
    fn create_flow(&self) -> Result<OwnedFlow>;
}

/// Contract for [`FlowFactory`]
pub struct FlowFactoryContract;

impl Contract for FlowFactoryContract {
    type Service = Arc<dyn FlowFactory>;
    const NAME: &'static str = "exhost.flow.FlowFactory";
}
