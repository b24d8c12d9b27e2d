//! Capability resolution for injectable owners.
//!
//! An owner declares which phases it handles through
//! [`Injectable::capabilities`]. Resolution runs once, at registration, and
//! turns the declaration into fixed callbacks. Nothing is re-checked at
//! dispatch time.
//!
//! Owners that handle every phase resolve to one full record
//! ([`Resolved::Full`]) and are inserted in a single registry operation.
//! Everything else resolves to one callback per declared phase
//! ([`Resolved::Partial`]), each merged into the owner's record.
//!
//! # Example
//!
//! ```
//! use phaseloop_injector::{Capabilities, CallbackResult, Injectable, PhaseSet};
//!
//! struct Spinner;
//!
//! impl Injectable for Spinner {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::Only(PhaseSet::UPDATE | PhaseSet::END_OF_FRAME)
//!     }
//!
//!     fn update(&self) -> CallbackResult {
//!         Ok(())
//!     }
//!
//!     fn end_of_frame(&self) -> CallbackResult {
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::callback::{Callback, CallbackResult};
use crate::owner::OwnerHandle;
use crate::phase::{Phase, PhaseSet};
use crate::record::PhaseCallbacks;

/// The phases an [`Injectable`] handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capabilities {
    /// Every phase.
    All,
    /// The given phases only. May be empty.
    Only(PhaseSet),
}

impl Capabilities {
    /// Returns the declared phases as a set.
    #[must_use]
    pub fn phases(self) -> PhaseSet {
        match self {
            Capabilities::All => PhaseSet::all(),
            Capabilities::Only(set) => set,
        }
    }
}

impl From<PhaseSet> for Capabilities {
    fn from(set: PhaseSet) -> Self {
        Capabilities::Only(set)
    }
}

/// An object that can be registered without spelling out its callbacks.
///
/// Phase methods default to doing nothing; only the phases named by
/// [`capabilities`](Self::capabilities) are registered.
pub trait Injectable: Send + Sync + 'static {
    /// Declares the phases this object handles.
    fn capabilities(&self) -> Capabilities;

    /// Called during [`Phase::Initialization`].
    fn initialization(&self) -> CallbackResult {
        Ok(())
    }

    /// Called during [`Phase::EarlyUpdate`].
    fn early_update(&self) -> CallbackResult {
        Ok(())
    }

    /// Called during [`Phase::FixedUpdate`].
    fn fixed_update(&self) -> CallbackResult {
        Ok(())
    }

    /// Called during [`Phase::PreUpdate`].
    fn pre_update(&self) -> CallbackResult {
        Ok(())
    }

    /// Called during [`Phase::Update`].
    fn update(&self) -> CallbackResult {
        Ok(())
    }

    /// Called during [`Phase::PostUpdate`].
    fn post_update(&self) -> CallbackResult {
        Ok(())
    }

    /// Called during [`Phase::EndOfFrame`].
    fn end_of_frame(&self) -> CallbackResult {
        Ok(())
    }

    /// Returns false once the object has been destroyed by its host.
    ///
    /// Checked in addition to the owner's reference count.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Callbacks produced by resolving an [`Injectable`].
#[derive(Debug)]
pub enum Resolved {
    /// The owner handles every phase.
    Full(PhaseCallbacks),
    /// The owner handles these phases only. Empty when it handles none.
    Partial(Vec<(Phase, Callback)>),
}

/// Resolves `target` into an owner handle and its callbacks.
///
/// The callbacks hold only a weak reference to `target`.
#[must_use]
pub fn resolve<T: Injectable>(target: &Arc<T>) -> (OwnerHandle, Resolved) {
    let owner = OwnerHandle::probed(target, T::is_alive);
    let resolved = match target.capabilities() {
        Capabilities::All => {
            Resolved::Full(PhaseCallbacks::full(|phase| phase_callback(target, phase)))
        }
        Capabilities::Only(set) => Resolved::Partial(
            set.phases()
                .map(|phase| (phase, phase_callback(target, phase)))
                .collect(),
        ),
    };
    (owner, resolved)
}

fn phase_callback<T: Injectable>(target: &Arc<T>, phase: Phase) -> Callback {
    let (method, method_name): (fn(&T) -> CallbackResult, &str) = match phase {
        Phase::Initialization => (T::initialization, "initialization"),
        Phase::EarlyUpdate => (T::early_update, "early_update"),
        Phase::FixedUpdate => (T::fixed_update, "fixed_update"),
        Phase::PreUpdate => (T::pre_update, "pre_update"),
        Phase::Update => (T::update, "update"),
        Phase::PostUpdate => (T::post_update, "post_update"),
        Phase::EndOfFrame => (T::end_of_frame, "end_of_frame"),
    };

    let weak = Arc::downgrade(target);
    Callback::fallible(move || match weak.upgrade() {
        Some(target) => method(&target),
        None => Ok(()),
    })
    .named(format!("{}::{}", core::any::type_name::<T>(), method_name))
}
