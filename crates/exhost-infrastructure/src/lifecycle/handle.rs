//! Active flow handle
//!
//! Bundles one flow with its lifetime scope, its window and the window's
//! closed subscription. Stopping a handle is idempotent: whichever path gets
//! there first (supersession, user close, completion, provider teardown)
//! performs the teardown and every later call is a no-op.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use exhost_domain::error::Error;
use exhost_domain::Disposable;
use exhost_domain::ports::{Flow, FlowState, FlowWindow, OwnedFlow, SubscriptionId};
use tracing::{debug, error, warn};

/// Identifier of a flow handle, unique per controller
pub type FlowId = u64;

/// One flow and everything owned on its behalf
pub struct FlowHandle {
    id: FlowId,
    flow: Arc<dyn Flow>,
    lifetime: Option<Arc<dyn Disposable>>,
    window: OnceLock<Arc<dyn FlowWindow>>,
    closed_subscription: Mutex<Option<SubscriptionId>>,
    state: Mutex<FlowState>,
    stopped: AtomicBool,
}

impl FlowHandle {
    /// Wrap a freshly created flow
    pub fn new(id: FlowId, owned: OwnedFlow) -> Self {
        Self {
            id,
            flow: owned.flow,
            lifetime: owned.lifetime,
            window: OnceLock::new(),
            closed_subscription: Mutex::new(None),
            state: Mutex::new(FlowState::Starting),
            stopped: AtomicBool::new(false),
        }
    }

    /// Handle identifier
    pub fn id(&self) -> FlowId {
        self.id
    }

    /// The wrapped flow
    pub fn flow(&self) -> &Arc<dyn Flow> {
        &self.flow
    }

    /// Window wrapping the flow, once attached
    pub fn window(&self) -> Option<&Arc<dyn FlowWindow>> {
        self.window.get()
    }

    /// Current lifecycle state
    pub fn state(&self) -> FlowState {
        *self.lock_state()
    }

    /// Whether the handle has been stopped
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Attach the window and its closed subscription
    ///
    /// When the handle was stopped in the meantime the window is closed
    /// right away instead.
    pub(crate) fn attach_window(&self, window: Arc<dyn FlowWindow>, subscription: SubscriptionId) {
        if self.window.set(window.clone()).is_err() {
            warn!(flow = self.id, "Flow already has a window, ignoring the new one");
            window.unsubscribe_closed(subscription);
            return;
        }
        *self.lock_subscription() = Some(subscription);

        if self.is_stopped() {
            self.release_window();
        }
    }

    /// Move from `Starting` to `Running`
    pub(crate) fn mark_running(&self) {
        let mut state = self.lock_state();
        if *state == FlowState::Starting && !self.is_stopped() {
            *state = FlowState::Running;
        }
    }

    /// Mark that the flow signalled its own completion
    pub(crate) fn mark_completing(&self) {
        if !self.is_stopped() {
            *self.lock_state() = FlowState::Completing;
        }
    }

    /// Stop the flow and release everything it owns
    ///
    /// Returns `false` when the handle was already stopped. Failures are
    /// logged; the handle ends up stopped regardless.
    pub fn stop(&self) -> bool {
        self.stop_collecting().is_some()
    }

    /// Like [`FlowHandle::stop`], returning the failures of the flow's own
    /// stop and of its lifetime release
    ///
    /// `None` when the handle was already stopped.
    pub(crate) fn stop_collecting(&self) -> Option<Vec<Error>> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return None;
        }
        {
            let mut state = self.lock_state();
            if *state != FlowState::Completing {
                *state = FlowState::Stopping;
            }
        }
        debug!(flow = self.id, "Stopping flow");

        let mut failures = Vec::new();
        self.release_window();

        if !self.flow.is_stopped() {
            if let Err(e) = self.flow.stop() {
                error!(flow = self.id, error = %e, "Flow failed to stop");
                failures.push(e);
            }
        }

        if let Some(lifetime) = &self.lifetime {
            if let Err(e) = lifetime.dispose() {
                error!(flow = self.id, error = %e, "Flow scope failed to release");
                failures.push(e);
            }
        }

        *self.lock_state() = FlowState::Idle;
        Some(failures)
    }

    fn release_window(&self) {
        let Some(window) = self.window.get() else {
            return;
        };
        let subscription = self.lock_subscription().take();
        if let Some(subscription) = subscription {
            window.unsubscribe_closed(subscription);
        }
        if let Err(e) = window.close() {
            warn!(flow = self.id, error = %e, "Flow window failed to close");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscription(&self) -> MutexGuard<'_, Option<SubscriptionId>> {
        self.closed_subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for FlowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("stopped", &self.is_stopped())
            .field("window", &self.window.get().is_some())
            .finish()
    }
}
