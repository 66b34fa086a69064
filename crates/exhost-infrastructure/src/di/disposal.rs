//! Disposal Registry
//!
//! Collects disposables handed out during resolution and releases them in
//! one pass, newest first. Tracking is keyed by allocation so an instance
//! resolved many times is released once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use exhost_domain::{Disposable, Error};
use tracing::{debug, warn};

/// Outcome of a bulk release
#[derive(Debug, Default)]
pub struct DisposalReport {
    /// Number of disposables released without error
    pub released: usize,
    /// Failures, in release order
    pub failures: Vec<Error>,
}

impl DisposalReport {
    /// Whether every disposable released cleanly
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Registry of disposables awaiting release
#[derive(Default)]
pub struct DisposalRegistry {
    tracked: Mutex<Vec<Arc<dyn Disposable>>>,
}

impl DisposalRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a disposable; returns `false` when it is already tracked
    pub fn track(&self, disposable: &Arc<dyn Disposable>) -> bool {
        let mut tracked = self.lock();
        if tracked.iter().any(|known| same_allocation(known, disposable)) {
            return false;
        }
        tracked.push(disposable.clone());
        true
    }

    /// Whether the disposable is tracked
    pub fn contains(&self, disposable: &Arc<dyn Disposable>) -> bool {
        self.lock()
            .iter()
            .any(|known| same_allocation(known, disposable))
    }

    /// Number of tracked disposables
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Release every tracked disposable, newest first
    ///
    /// A failing disposable does not prevent the others from being released.
    pub fn release_all(&self) -> DisposalReport {
        let drained: Vec<Arc<dyn Disposable>> = std::mem::take(&mut *self.lock());
        let mut report = DisposalReport::default();

        for disposable in drained.into_iter().rev() {
            match disposable.dispose() {
                Ok(()) => report.released += 1,
                Err(e) => {
                    warn!(error = %e, "Tracked disposable failed to release");
                    report.failures.push(e);
                }
            }
        }

        debug!(
            released = report.released,
            failed = report.failures.len(),
            "Released tracked disposables"
        );
        report
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Disposable>>> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DisposalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposalRegistry")
            .field("tracked", &self.len())
            .finish()
    }
}

fn same_allocation(a: &Arc<dyn Disposable>, b: &Arc<dyn Disposable>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
