//! Per-phase fan-out.
//!
//! A dispatch receives callbacks that were already snapshotted out of the
//! registry and global set. No lock is held while they run, so a callback may
//! register or unregister anything; the change is seen by the next dispatch.

use crate::callback::{Callback, CallbackError};
use crate::owner::OwnerHandle;
use crate::phase::Phase;

// ─────────────────────────────────────────────────────────────────────────────
// DispatchReport
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of dispatching one phase.
#[derive(Debug)]
pub struct DispatchReport {
    phase: Phase,
    evicted: usize,
    global_invoked: usize,
    invoked: usize,
    skipped: usize,
    failures: Vec<CallbackError>,
}

impl DispatchReport {
    pub(crate) fn new(phase: Phase) -> Self {
        Self {
            phase,
            evicted: 0,
            global_invoked: 0,
            invoked: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn set_evicted(&mut self, evicted: usize) {
        self.evicted = evicted;
    }

    /// Returns the dispatched phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the number of stale registrations evicted before dispatch.
    ///
    /// Always zero outside [`Phase::Initialization`].
    #[must_use]
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    /// Returns the number of global callbacks invoked.
    #[must_use]
    pub fn global_invoked(&self) -> usize {
        self.global_invoked
    }

    /// Returns the number of registration callbacks invoked.
    #[must_use]
    pub fn invoked(&self) -> usize {
        self.invoked
    }

    /// Returns the number of registration callbacks skipped because their
    /// owner was no longer live.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the callbacks that failed, in invocation order.
    #[must_use]
    pub fn failures(&self) -> &[CallbackError] {
        &self.failures
    }

    /// Returns true if no callback failed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fan-out
// ─────────────────────────────────────────────────────────────────────────────

/// Callbacks captured for one phase dispatch.
pub(crate) struct PhaseCapture {
    pub(crate) global: Vec<Callback>,
    pub(crate) registered: Vec<(OwnerHandle, Callback)>,
}

/// Invokes the global callbacks, then each live owner's callback.
pub(crate) fn fan_out(report: &mut DispatchReport, capture: PhaseCapture, isolate_panics: bool) {
    let phase = report.phase;

    for callback in &capture.global {
        report.global_invoked += 1;
        record(report, phase, callback.call(isolate_panics));
    }

    for (owner, callback) in &capture.registered {
        if !owner.is_alive() {
            report.skipped += 1;
            continue;
        }
        report.invoked += 1;
        record(report, phase, callback.call(isolate_panics));
    }
}

fn record(report: &mut DispatchReport, phase: Phase, outcome: Result<(), CallbackError>) {
    if let Err(error) = outcome {
        tracing::error!(%phase, callback = error.callback(), %error, "phase callback failed");
        report.failures.push(error);
    }
}
