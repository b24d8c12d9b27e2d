//! Registration records: one optional callback per phase.

use crate::callback::Callback;
use crate::owner::OwnerHandle;
use crate::phase::{Phase, PhaseSet};

/// Up to one callback per phase.
#[derive(Debug, Clone, Default)]
pub struct PhaseCallbacks {
    slots: [Option<Callback>; Phase::COUNT],
}

impl PhaseCallbacks {
    /// Creates an empty set of slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates slots with every phase populated by `callback(phase)`.
    #[must_use]
    pub fn full(mut callback: impl FnMut(Phase) -> Callback) -> Self {
        Self {
            slots: Phase::ALL.map(|phase| Some(callback(phase))),
        }
    }

    /// Sets `phase`'s callback, returning the one it replaced.
    pub fn set(&mut self, phase: Phase, callback: Callback) -> Option<Callback> {
        self.slots[phase.index()].replace(callback)
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, phase: Phase, callback: Callback) -> Self {
        self.set(phase, callback);
        self
    }

    /// Returns `phase`'s callback.
    #[must_use]
    pub fn get(&self, phase: Phase) -> Option<&Callback> {
        self.slots[phase.index()].as_ref()
    }

    /// Copies every populated slot of `other` into `self`. Last write wins.
    ///
    /// Returns the callbacks that were replaced.
    pub fn merge(&mut self, other: PhaseCallbacks) -> PhaseCallbacks {
        let mut displaced = PhaseCallbacks::new();
        for (phase, incoming) in Phase::ALL.into_iter().zip(other.slots) {
            if let Some(previous) = incoming.and_then(|callback| self.set(phase, callback)) {
                displaced.set(phase, previous);
            }
        }
        displaced
    }

    /// Returns the set of populated phases.
    #[must_use]
    pub fn phases(&self) -> PhaseSet {
        Phase::ALL
            .into_iter()
            .filter(|phase| self.get(*phase).is_some())
            .collect()
    }

    /// Returns true if no slot is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// A registered owner and its phase callbacks.
#[derive(Debug, Clone)]
pub struct Registration {
    owner: OwnerHandle,
    callbacks: PhaseCallbacks,
}

impl Registration {
    /// Creates a record with no callbacks.
    #[must_use]
    pub fn new(owner: OwnerHandle) -> Self {
        Self::with_callbacks(owner, PhaseCallbacks::new())
    }

    /// Creates a record with the given callbacks.
    #[must_use]
    pub fn with_callbacks(owner: OwnerHandle, callbacks: PhaseCallbacks) -> Self {
        Self { owner, callbacks }
    }

    /// Returns the owner handle.
    #[must_use]
    pub fn owner(&self) -> &OwnerHandle {
        &self.owner
    }

    /// Returns the callbacks mutably.
    pub fn callbacks_mut(&mut self) -> &mut PhaseCallbacks {
        &mut self.callbacks
    }

    /// Returns `phase`'s callback.
    #[must_use]
    pub fn callback(&self, phase: Phase) -> Option<&Callback> {
        self.callbacks.get(phase)
    }
}
