//! Flow Lifecycle Controller
//!
//! Owns the single active-flow slot and sequences setup, start, user and
//! programmatic stop, and completion:
//!
//! ```text
//! setup_ui(kind)
//!   │  stop_ui()                       previous flow fully stopped first
//!   │  resolve FlowFactory ─▶ create_flow()
//!   │  flow_channel(completion hook)   hook bound to *this* handle
//!   │  flow.select(kind, reporter)
//!   │  create_window ─▶ subscribe closed handler
//!   │  slot ◀─ handle
//!   │  flow.start(connection)
//!   ▼
//! LoadEvents (lazy)
//! ```
//!
//! Completion and user-close callbacks only ever stop the handle they were
//! created for, and only clear the slot if it still holds that handle, so a
//! late callback from a superseded flow cannot tear down its successor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use exhost_domain::error::{Error, Result};
use exhost_domain::ports::{
    flow_channel, ClosedHandler, ConnectionContext, FlowFactoryContract, FlowKind, FlowState,
    FlowWindow, LoadEvents, WindowFactory,
};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, error, info};

use crate::config::LifecycleConfig;
use crate::di::ServiceResolver;
use crate::error_ext::ErrorContext;
use crate::lifecycle::handle::{FlowHandle, FlowId};

/// Slot holding the active flow, if any
#[derive(Default)]
struct ActiveFlowSlot {
    active: ArcSwapOption<FlowHandle>,
}

impl ActiveFlowSlot {
    fn current(&self) -> Option<Arc<FlowHandle>> {
        self.active.load_full()
    }

    fn replace(&self, handle: Arc<FlowHandle>) -> Option<Arc<FlowHandle>> {
        self.active.swap(Some(handle))
    }

    fn take(&self) -> Option<Arc<FlowHandle>> {
        self.active.swap(None)
    }

    /// Clear the slot only if it still holds `handle`
    fn clear_if(&self, handle: &Arc<FlowHandle>) -> bool {
        let previous = self
            .active
            .compare_and_swap(handle, None::<Arc<FlowHandle>>);
        match &*previous {
            Some(previous) => Arc::ptr_eq(previous, handle),
            None => false,
        }
    }
}

/// Sequences the single active UI flow
pub struct FlowLifecycleController {
    slot: Arc<ActiveFlowSlot>,
    window_factory: Arc<dyn WindowFactory>,
    strict_lifecycle: bool,
    next_id: AtomicU64,
}

impl FlowLifecycleController {
    /// Create a controller creating windows through `window_factory`
    pub fn new(window_factory: Arc<dyn WindowFactory>, config: &LifecycleConfig) -> Self {
        Self {
            slot: Arc::new(ActiveFlowSlot::default()),
            window_factory,
            strict_lifecycle: config.strict_lifecycle,
            next_id: AtomicU64::new(1),
        }
    }

    /// Replace the active flow with a new flow of `kind`
    ///
    /// Returns the flow's load events. Failures are logged and yield an
    /// empty, already-complete stream with no active flow left behind.
    pub fn setup_ui(
        &self,
        resolver: &ServiceResolver,
        kind: &FlowKind,
        connection: Option<ConnectionContext>,
    ) -> LoadEvents {
        self.stop_ui();

        match self.create_flow(resolver, kind, connection) {
            Ok(events) => events,
            Err(e) => {
                error!(kind = %kind, error = %e, "Failed to set up flow");
                stream::empty().boxed()
            }
        }
    }

    fn create_flow(
        &self,
        resolver: &ServiceResolver,
        kind: &FlowKind,
        connection: Option<ConnectionContext>,
    ) -> Result<LoadEvents> {
        let factory = resolver.resolve::<FlowFactoryContract>()?;
        let owned = factory.create_flow()?;
        let handle = Arc::new(FlowHandle::new(
            self.next_id.fetch_add(1, Ordering::Relaxed),
            owned,
        ));
        info!(flow = handle.id(), kind = %kind, "Setting up flow");

        let (reporter, events) = flow_channel(completion_hook(&self.slot, &handle));
        if let Err(e) = handle
            .flow()
            .select(kind, reporter)
            .flow_context(format!("Flow rejected kind '{kind}'"))
        {
            handle.stop();
            return Err(e);
        }
        if handle.is_stopped() {
            debug!(flow = handle.id(), "Flow completed while selecting its kind");
            return Ok(events);
        }

        let window = match self
            .window_factory
            .create_window(handle.flow().clone())
            .flow_context("Window factory failed")
        {
            Ok(window) => window,
            Err(e) => {
                handle.stop();
                return Err(e);
            }
        };
        let subscription = window.subscribe_closed(closed_handler(&self.slot, &handle));
        handle.attach_window(window, subscription);
        if handle.is_stopped() {
            debug!(flow = handle.id(), "Flow completed while its window was created");
            return Ok(events);
        }

        if let Some(previous) = self.slot.replace(handle.clone()) {
            previous.stop();
        }
        if handle.is_stopped() {
            self.slot.clear_if(&handle);
            return Ok(events);
        }

        if let Err(e) = handle
            .flow()
            .start(connection)
            .flow_context("Flow failed to start")
        {
            self.slot.clear_if(&handle);
            handle.stop();
            return Err(e);
        }
        handle.mark_running();

        Ok(events)
    }

    /// Stop and dispose the active flow, if any
    ///
    /// Returns whether a flow was active.
    pub fn stop_ui(&self) -> bool {
        self.stop_active().is_some()
    }

    /// Stop the active flow, returning the failures hit while stopping it
    ///
    /// `None` when no flow was active.
    pub(crate) fn stop_active(&self) -> Option<Vec<Error>> {
        let handle = self.slot.take()?;
        info!(flow = handle.id(), "Stopping active flow");
        Some(handle.stop_collecting().unwrap_or_default())
    }

    /// Completion-state updates of the active flow
    ///
    /// Without an active flow this yields `false` once (or panics when
    /// strict lifecycle checking is on).
    pub fn listen_to_completion_state(&self) -> BoxStream<'static, bool> {
        match self.slot.current() {
            Some(handle) => handle.flow().completion_state(),
            None => {
                self.lifecycle_misuse("listen_to_completion_state");
                stream::iter([false]).boxed()
            }
        }
    }

    /// Show the active flow's window modally, blocking until dismissed
    pub fn run_ui(&self) {
        match self.active_window() {
            Some((id, window)) => show_modal(id, &window),
            None => self.lifecycle_misuse("run_ui"),
        }
    }

    /// Set up a flow of `kind` and show it modally
    pub fn run_ui_with(
        &self,
        resolver: &ServiceResolver,
        kind: &FlowKind,
        connection: Option<ConnectionContext>,
    ) {
        let _events = self.setup_ui(resolver, kind, connection);
        match self.active_window() {
            Some((id, window)) => show_modal(id, &window),
            None => error!(kind = %kind, "No flow to show after setup"),
        }
    }

    /// Show the active flow's window without blocking
    pub fn show_ui(&self) {
        let Some((id, window)) = self.active_window() else {
            self.lifecycle_misuse("show_ui");
            return;
        };
        if let Err(e) = window.show() {
            error!(flow = id, error = %e, "Flow window failed to show");
        }
    }

    /// State of the active flow slot
    pub fn flow_state(&self) -> FlowState {
        self.slot
            .current()
            .map(|handle| handle.state())
            .unwrap_or_default()
    }

    /// Identifier of the active flow
    pub fn active_flow_id(&self) -> Option<FlowId> {
        self.slot.current().map(|handle| handle.id())
    }

    /// Whether a flow is active
    pub fn has_active_flow(&self) -> bool {
        self.slot.current().is_some()
    }

    fn active_window(&self) -> Option<(FlowId, Arc<dyn FlowWindow>)> {
        let handle = self.slot.current()?;
        let window = handle.window()?.clone();
        Some((handle.id(), window))
    }

    fn lifecycle_misuse(&self, operation: &str) {
        let error = Error::lifecycle_misuse(operation);
        if self.strict_lifecycle {
            panic!("{error}");
        }
        error!(operation, "{error}");
    }
}

impl std::fmt::Debug for FlowLifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowLifecycleController")
            .field("active", &self.active_flow_id())
            .field("state", &self.flow_state())
            .field("strict_lifecycle", &self.strict_lifecycle)
            .finish()
    }
}

fn show_modal(id: FlowId, window: &Arc<dyn FlowWindow>) {
    info!(flow = id, "Showing flow window modally");
    if let Err(e) = window.show_modal() {
        error!(flow = id, error = %e, "Flow window failed while shown modally");
    }
}

fn completion_hook(
    slot: &Arc<ActiveFlowSlot>,
    handle: &Arc<FlowHandle>,
) -> impl FnOnce() + Send + 'static {
    let slot: Weak<ActiveFlowSlot> = Arc::downgrade(slot);
    let handle: Weak<FlowHandle> = Arc::downgrade(handle);
    move || {
        let Some(handle) = handle.upgrade() else {
            return;
        };
        info!(flow = handle.id(), "Flow completed");
        handle.mark_completing();
        handle.stop();
        if let Some(slot) = slot.upgrade() {
            slot.clear_if(&handle);
        }
    }
}

fn closed_handler(slot: &Arc<ActiveFlowSlot>, handle: &Arc<FlowHandle>) -> ClosedHandler {
    let slot: Weak<ActiveFlowSlot> = Arc::downgrade(slot);
    let handle: Weak<FlowHandle> = Arc::downgrade(handle);
    Arc::new(move || {
        let Some(handle) = handle.upgrade() else {
            return;
        };
        info!(flow = handle.id(), "Flow window closed by user");
        if let Some(slot) = slot.upgrade() {
            slot.clear_if(&handle);
        }
        handle.stop();
    })
}
