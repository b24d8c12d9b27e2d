//! The process-wide injector.
//!
//! Components that cannot be handed an [`Injector`] reach the shared one
//! through these functions. It is created on first use with
//! [`InjectorConfig::from_env`] and lives until the process exits; the
//! `clear_*` functions are the only way to empty it.
//!
//! ```
//! use std::sync::Arc;
//!
//! use phaseloop_injector::{Callback, Phase, shared};
//!
//! let owner = Arc::new(());
//! shared::register_callback(&owner, Phase::EndOfFrame, Callback::new(|| {}));
//! assert!(shared::is_registered(&owner));
//!
//! shared::unregister(&owner);
//! assert!(!shared::is_registered(&owner));
//! ```

use std::sync::{Arc, LazyLock};

use phaseloop_pipeline::PlayerLoop;

use crate::callback::Callback;
use crate::capability::Injectable;
use crate::config::InjectorConfig;
use crate::dispatch::DispatchReport;
use crate::error::InjectorError;
use crate::injector::{InstallReport, Injector};
use crate::introspect::InjectorSnapshot;
use crate::owner::{OwnerHandle, OwnerId};
use crate::phase::{Phase, PhaseSet};

static SHARED: LazyLock<Arc<Injector>> =
    LazyLock::new(|| Arc::new(Injector::with_config(InjectorConfig::from_env())));

/// Returns the process-wide injector.
#[must_use]
pub fn shared() -> Arc<Injector> {
    Arc::clone(&SHARED)
}

/// See [`Injector::register`].
pub fn register<T: Injectable>(owner: &Arc<T>) {
    SHARED.register(owner);
}

/// See [`Injector::register_callback`].
pub fn register_callback(owner: impl Into<OwnerHandle>, phase: Phase, callback: Callback) {
    SHARED.register_callback(owner, phase, callback);
}

/// See [`Injector::register_phases`].
pub fn register_phases(owner: impl Into<OwnerHandle>, phases: PhaseSet, callback: Callback) {
    SHARED.register_phases(owner, phases, callback);
}

/// See [`Injector::unregister`].
pub fn unregister(owner: impl Into<OwnerId>) -> bool {
    SHARED.unregister(owner)
}

/// See [`Injector::is_registered`].
#[must_use]
pub fn is_registered(owner: impl Into<OwnerId>) -> bool {
    SHARED.is_registered(owner)
}

/// See [`Injector::registration_count`].
#[must_use]
pub fn registration_count() -> usize {
    SHARED.registration_count()
}

/// See [`Injector::global_register`].
pub fn global_register(phase: Phase, callback: Callback) {
    SHARED.global_register(phase, callback);
}

/// See [`Injector::global_unregister`].
pub fn global_unregister(phase: Phase, callback: &Callback) -> bool {
    SHARED.global_unregister(phase, callback)
}

/// See [`Injector::clear_global`].
pub fn clear_global() {
    SHARED.clear_global();
}

/// See [`Injector::clear_all_registrations`].
pub fn clear_all_registrations() {
    SHARED.clear_all_registrations();
}

/// See [`Injector::clear_everything`].
pub fn clear_everything() {
    SHARED.clear_everything();
}

/// See [`Injector::snapshot`].
#[must_use]
pub fn snapshot() -> InjectorSnapshot {
    SHARED.snapshot()
}

/// See [`Injector::install`].
///
/// # Errors
///
/// Returns [`InjectorError::AlreadyInstalled`] on every call after the first.
pub fn install(player_loop: &mut PlayerLoop) -> Result<InstallReport, InjectorError> {
    SHARED.install(player_loop)
}

/// See [`Injector::dispatch`].
pub fn dispatch(phase: Phase) -> DispatchReport {
    SHARED.dispatch(phase)
}
