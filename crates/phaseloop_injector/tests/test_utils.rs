//! Shared test utilities for `phaseloop_injector` integration tests.
//!
//! This module provides common injectables, callbacks, and setup used across
//! multiple test files. Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use phaseloop_injector::prelude::*;
use phaseloop_pipeline::PlayerLoop;
use phaseloop_tracing::TracingConfig;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak, mpsc};
use std::thread;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// SETUP
// ═══════════════════════════════════════════════════════════════════════════════

/// Creates an injector spliced into a fresh default loop.
pub fn installed_injector() -> (Arc<Injector>, PlayerLoop) {
    installed_injector_with(InjectorConfig::default())
}

/// Creates an injector with `config` spliced into a fresh default loop.
pub fn installed_injector_with(config: InjectorConfig) -> (Arc<Injector>, PlayerLoop) {
    TracingConfig::for_tests().init();

    let injector = Arc::new(Injector::with_config(config));
    let mut player_loop = PlayerLoop::default_loop();
    let report = injector
        .install(&mut player_loop)
        .expect("fresh injector installs");
    assert!(report.is_complete(), "default loop has every target");
    (injector, player_loop)
}

/// Runs `f` on another thread and fails if it has not returned within a few
/// seconds. For operations whose regression would hang rather than fail.
pub fn finishes<T: Send + 'static>(what: &str, f: impl FnOnce() -> T + Send + 'static) -> T {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(Duration::from_secs(5))
        .unwrap_or_else(|_| panic!("{what} hung or panicked"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared, ordered record of events.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// Returns a callback that appends `label` when invoked.
    pub fn callback(&self, label: &'static str) -> Callback {
        let log = self.clone();
        Callback::new(move || log.push(label)).named(label)
    }
}

/// Returns a callback that increments `count`.
pub fn counting(count: &Arc<AtomicUsize>) -> Callback {
    let count = Arc::clone(count);
    Callback::new(move || {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

/// Calls back into the injector when dropped.
pub struct Reenter {
    injector: Weak<Injector>,
    action: fn(&Injector),
    ran: Arc<AtomicBool>,
}

impl Reenter {
    /// Returns a callback whose destructor runs `action` on `injector`, and
    /// a flag set once it has.
    pub fn on_drop(injector: &Arc<Injector>, action: fn(&Injector)) -> (Callback, Arc<AtomicBool>) {
        let ran = Arc::new(AtomicBool::new(false));
        let guard = Reenter {
            injector: Arc::downgrade(injector),
            action,
            ran: Arc::clone(&ran),
        };
        let callback = Callback::new(move || {
            let _ = &guard;
        })
        .named("reenter-on-drop");
        (callback, ran)
    }
}

impl Drop for Reenter {
    fn drop(&mut self) {
        if let Some(injector) = self.injector.upgrade() {
            (self.action)(&injector);
            self.ran.store(true, Ordering::SeqCst);
        }
    }
}

/// A host-supplied handle with a chosen id and an external liveness flag.
pub struct RawHandle {
    pub id: usize,
    pub alive: Arc<AtomicBool>,
}

impl RawHandle {
    /// Returns a live handle for `id` and the flag that controls it.
    pub fn live(id: usize) -> (OwnerHandle, Arc<AtomicBool>) {
        let alive = Arc::new(AtomicBool::new(true));
        let handle = OwnerHandle::from_handle(RawHandle {
            id,
            alive: Arc::clone(&alive),
        });
        (handle, alive)
    }
}

impl WeakHandle for RawHandle {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn owner_id(&self) -> OwnerId {
        OwnerId::from_raw(self.id)
    }

    fn type_name(&self) -> &'static str {
        "RawHandle"
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INJECTABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Handles only [`Phase::Update`] and counts the calls.
#[derive(Default)]
pub struct UpdateCounter {
    pub updates: AtomicUsize,
}

impl UpdateCounter {
    pub fn count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl Injectable for UpdateCounter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::Only(PhaseSet::UPDATE)
    }

    fn update(&self) -> CallbackResult {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Handles every phase and records each one it sees.
#[derive(Default)]
pub struct PhaseRecorder {
    pub seen: Mutex<Vec<Phase>>,
}

impl PhaseRecorder {
    fn see(&self, phase: Phase) -> CallbackResult {
        self.seen.lock().unwrap().push(phase);
        Ok(())
    }

    pub fn seen(&self) -> Vec<Phase> {
        self.seen.lock().unwrap().clone()
    }
}

impl Injectable for PhaseRecorder {
    fn capabilities(&self) -> Capabilities {
        Capabilities::All
    }

    fn initialization(&self) -> CallbackResult {
        self.see(Phase::Initialization)
    }

    fn early_update(&self) -> CallbackResult {
        self.see(Phase::EarlyUpdate)
    }

    fn fixed_update(&self) -> CallbackResult {
        self.see(Phase::FixedUpdate)
    }

    fn pre_update(&self) -> CallbackResult {
        self.see(Phase::PreUpdate)
    }

    fn update(&self) -> CallbackResult {
        self.see(Phase::Update)
    }

    fn post_update(&self) -> CallbackResult {
        self.see(Phase::PostUpdate)
    }

    fn end_of_frame(&self) -> CallbackResult {
        self.see(Phase::EndOfFrame)
    }
}

/// A wrapper around an object the host can destroy while it is still
/// referenced.
#[derive(Default)]
pub struct HostObject {
    pub destroyed: AtomicBool,
    pub updates: AtomicUsize,
}

impl HostObject {
    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl Lifecycle for HostObject {
    fn is_alive(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst)
    }
}

impl Injectable for HostObject {
    fn capabilities(&self) -> Capabilities {
        Capabilities::Only(PhaseSet::UPDATE)
    }

    fn update(&self) -> CallbackResult {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst)
    }
}

/// Handles [`Phase::Update`] and queries the injector from its liveness check.
pub struct Watcher {
    pub injector: Weak<Injector>,
    pub checks: AtomicUsize,
}

impl Watcher {
    pub fn new(injector: &Arc<Injector>) -> Self {
        Self {
            injector: Arc::downgrade(injector),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl Injectable for Watcher {
    fn capabilities(&self) -> Capabilities {
        Capabilities::Only(PhaseSet::UPDATE)
    }

    fn is_alive(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if let Some(injector) = self.injector.upgrade() {
            let _ = injector.registration_count();
            injector.unregister(OwnerId::from_raw(0));
        }
        true
    }
}
