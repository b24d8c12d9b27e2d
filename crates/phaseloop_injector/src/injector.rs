//! The injector facade.
//!
//! [`Injector`] owns the registry and the global callback set, splices its
//! dispatch leaves into a [`PlayerLoop`] once, and fans each phase out to
//! whatever is registered when the phase runs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use phaseloop_injector::{Callback, Injector, Phase};
//! use phaseloop_pipeline::PlayerLoop;
//!
//! let injector = Arc::new(Injector::new());
//! let mut player_loop = PlayerLoop::default_loop();
//! injector.install(&mut player_loop).unwrap();
//!
//! let owner = Arc::new(());
//! let ticks = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&ticks);
//! injector.register_callback(&owner, Phase::Update, Callback::new(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! player_loop.run_frames(3, 1);
//! assert_eq!(ticks.load(Ordering::SeqCst), 3);
//! ```

use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use phaseloop_pipeline::{PipelineNode, PlayerLoop, SpliceRequest};

use crate::callback::Callback;
use crate::capability::{self, Injectable, Resolved};
use crate::config::InjectorConfig;
use crate::dispatch::{self, DispatchReport, PhaseCapture};
use crate::error::{InjectorError, PhaseSpliceError};
use crate::global::GlobalCallbacks;
use crate::introspect::{InjectorSnapshot, SnapshotCapture};
use crate::owner::{OwnerHandle, OwnerId};
use crate::phase::{Phase, PhaseSet, markers};
use crate::record::{PhaseCallbacks, Registration};
use crate::registry::Registry;

// ─────────────────────────────────────────────────────────────────────────────
// InstallReport
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of splicing the dispatch leaves into a loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Phases whose dispatch leaf was inserted.
    pub wired: PhaseSet,
    /// Phases whose insertion point was not found. These never dispatch
    /// from the loop.
    pub failed: Vec<PhaseSpliceError>,
}

impl InstallReport {
    /// Returns true if every phase was wired.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Injector
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of per-phase callbacks and their dispatcher.
///
/// # Thread Safety
///
/// State sits behind two [`RwLock`]s, taken one at a time. Neither is held
/// while host code runs: callbacks, liveness probes and the destructors of
/// removed callbacks all run unlocked. Callbacks may register and unregister
/// freely, including themselves; changes apply from the next phase dispatch.
pub struct Injector {
    config: InjectorConfig,
    registry: RwLock<Registry>,
    global: RwLock<GlobalCallbacks>,
    installed: AtomicBool,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector {
    /// Creates an injector with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(InjectorConfig::default())
    }

    /// Creates an injector with `config`.
    #[must_use]
    pub fn with_config(config: InjectorConfig) -> Self {
        Self {
            config,
            registry: RwLock::new(Registry::new()),
            global: RwLock::new(GlobalCallbacks::new()),
            installed: AtomicBool::new(false),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────

    /// Registers every phase `owner` declares through [`Injectable`].
    ///
    /// Phases are merged into any existing record for `owner`. An owner that
    /// declares no phases registers nothing.
    pub fn register<T: Injectable>(&self, owner: &Arc<T>) {
        let (handle, resolved) = capability::resolve(owner);
        let id = handle.id();
        let _stale = self.displace_stale(id);
        let _replaced = match resolved {
            Resolved::Full(callbacks) => {
                let replaced = self.registry.write().upsert_full(&handle, callbacks);
                tracing::debug!(owner = %id, owner_type = core::any::type_name::<T>(), "registered all phases");
                replaced
            }
            Resolved::Partial(callbacks) => {
                let phases: PhaseSet = callbacks.iter().map(|(phase, _)| *phase).collect();
                let mut replaced = PhaseCallbacks::new();
                let mut registry = self.registry.write();
                for (phase, callback) in callbacks {
                    if let Some(previous) = registry.upsert(&handle, phase, callback) {
                        replaced.set(phase, previous);
                    }
                }
                drop(registry);
                tracing::debug!(
                    owner = %id,
                    owner_type = core::any::type_name::<T>(),
                    ?phases,
                    "registered phases"
                );
                replaced
            }
        };
    }

    /// Sets `owner`'s callback for `phase`, replacing any previous one.
    pub fn register_callback(&self, owner: impl Into<OwnerHandle>, phase: Phase, callback: Callback) {
        let owner = owner.into();
        tracing::debug!(owner = %owner.id(), %phase, callback = callback.label(), "registered callback");
        let _stale = self.displace_stale(owner.id());
        let _replaced = self.registry.write().upsert(&owner, phase, callback);
    }

    /// Sets `owner`'s callback for every phase in `phases`.
    pub fn register_phases(
        &self,
        owner: impl Into<OwnerHandle>,
        phases: PhaseSet,
        callback: Callback,
    ) {
        let owner = owner.into();
        tracing::debug!(owner = %owner.id(), ?phases, callback = callback.label(), "registered callback");
        let _stale = self.displace_stale(owner.id());
        let mut registry = self.registry.write();
        let _replaced: Vec<Callback> = phases
            .phases()
            .filter_map(|phase| registry.upsert(&owner, phase, callback.clone()))
            .collect();
        drop(registry);
    }

    /// Removes every callback of `owner`.
    ///
    /// Returns false if `owner` had no live registration. A record left
    /// behind by a dead owner under the same id is removed either way.
    pub fn unregister(&self, owner: impl Into<OwnerId>) -> bool {
        let id = owner.into();
        let removed = self.registry.write().remove(id);
        let Some(record) = removed else {
            return false;
        };
        let live = record.owner().is_alive();
        tracing::debug!(owner = %id, live, "unregistered");
        live
    }

    /// Returns true if `owner` is registered and still live.
    #[must_use]
    pub fn is_registered(&self, owner: impl Into<OwnerId>) -> bool {
        let handle = self.registry.read().owner(owner.into());
        handle.is_some_and(|handle| handle.is_alive())
    }

    /// Returns the number of registered owners, including stale ones not
    /// yet evicted.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Attaches an ownerless callback that fires before every registration
    /// in `phase`.
    pub fn global_register(&self, phase: Phase, callback: Callback) {
        tracing::debug!(%phase, callback = callback.label(), "attached global callback");
        self.global.write().add(phase, callback);
    }

    /// Detaches `callback` from `phase`. Returns false if it was not attached.
    pub fn global_unregister(&self, phase: Phase, callback: &Callback) -> bool {
        let detached = self.global.write().remove(phase, callback);
        detached.is_some()
    }

    /// Detaches every global callback.
    pub fn clear_global(&self) {
        let detached = self.global.write().clear();
        drop(detached);
    }

    /// Removes every owner registration.
    pub fn clear_all_registrations(&self) {
        let removed = self.registry.write().clear();
        drop(removed);
    }

    /// Removes every owner registration and global callback.
    pub fn clear_everything(&self) {
        self.clear_all_registrations();
        self.clear_global();
        tracing::debug!("cleared all callbacks");
    }

    /// Copies the current registrations for inspection.
    #[must_use]
    pub fn snapshot(&self) -> InjectorSnapshot {
        let global = self.global.read().clone();
        let capture = SnapshotCapture::new(self.is_installed(), &self.registry.read(), &global);
        capture.resolve()
    }

    /// Removes the record under `id` if its owner is dead, so that a new
    /// owner reusing the id starts a fresh record at the end of the order.
    fn displace_stale(&self, id: OwnerId) -> Option<Registration> {
        let existing = self.registry.read().owner(id)?;
        if existing.is_alive() {
            return None;
        }
        tracing::debug!(owner = %id, "replacing stale registration with reused owner id");
        self.registry.write().remove_record(&existing)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Loop integration
    // ─────────────────────────────────────────────────────────────────────

    /// Returns true once [`install`](Self::install) has run.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    /// Splices one dispatch leaf per phase into `player_loop`.
    ///
    /// Each phase is placed according to [`InjectorConfig::mapping`]. A
    /// phase whose target node is missing is logged and reported, and the
    /// remaining phases are still wired. The leaves hold a weak reference to
    /// the injector and do nothing once it is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::AlreadyInstalled`] if this injector was
    /// installed before.
    pub fn install(self: &Arc<Self>, player_loop: &mut PlayerLoop) -> Result<InstallReport, InjectorError> {
        if self
            .installed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(InjectorError::AlreadyInstalled);
        }

        let requests = Phase::ALL.map(|phase| {
            let mapping = self.config.mapping(phase);
            SpliceRequest::new(mapping.target, self.dispatch_leaf(phase)).at(mapping.position)
        });
        let results = player_loop.splice_all(requests);

        let mut report = InstallReport {
            wired: PhaseSet::empty(),
            failed: Vec::new(),
        };
        for (phase, result) in Phase::ALL.into_iter().zip(results) {
            match result {
                Ok(()) => report.wired |= phase.as_set(),
                Err(source) => {
                    let error = PhaseSpliceError { phase, source };
                    tracing::error!(%phase, %error, "phase will not dispatch");
                    report.failed.push(error);
                }
            }
        }

        tracing::info!(
            wired = report.wired.bits().count_ones(),
            failed = report.failed.len(),
            "installed phase dispatch into player loop"
        );
        Ok(report)
    }

    /// Runs `phase`: evicts stale owners on [`Phase::Initialization`], then
    /// invokes global callbacks and live owner callbacks in order.
    pub fn dispatch(&self, phase: Phase) -> DispatchReport {
        let _span = tracing::trace_span!("dispatch", %phase).entered();
        let mut report = DispatchReport::new(phase);

        if phase == Phase::Initialization {
            let evicted = self.evict_stale();
            if !evicted.is_empty() {
                tracing::debug!(evicted = evicted.len(), "evicted stale registrations");
            }
            report.set_evicted(evicted.len());
        }

        let global = self.global.read().get(phase).to_vec();
        let registered = self.registry.read().callbacks_for(phase);
        let capture = PhaseCapture { global, registered };
        dispatch::fan_out(&mut report, capture, self.config.isolate_panics());
        report
    }

    /// Runs the phase at `index` in frame order.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::InvalidPhase`] if `index` names no phase.
    pub fn dispatch_index(&self, index: usize) -> Result<DispatchReport, InjectorError> {
        let phase = Phase::from_index(index)?;
        Ok(self.dispatch(phase))
    }

    /// Probes every owner with no lock held, then evicts the dead ones.
    fn evict_stale(&self) -> Vec<Registration> {
        let owners = self.registry.read().owners();
        let stale: Vec<OwnerHandle> = owners.into_iter().filter(|owner| !owner.is_alive()).collect();
        if stale.is_empty() {
            return Vec::new();
        }
        self.registry.write().evict_stale(&stale)
    }

    fn dispatch_leaf(self: &Arc<Self>, phase: Phase) -> PipelineNode {
        let injector: Weak<Self> = Arc::downgrade(self);
        PipelineNode::of_type(markers::dispatch_node(phase)).update(Arc::new(move || {
            if let Some(injector) = injector.upgrade() {
                injector.dispatch(phase);
            }
        }))
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("config", &self.config)
            .field("registrations", &self.registration_count())
            .field("global", &self.global.read().len())
            .field("installed", &self.is_installed())
            .finish()
    }
}
