//! Read-only view of what is registered.
//!
//! A snapshot is a plain copy taken under the injector's locks; holding one
//! does not block registration or dispatch. Liveness is probed after the
//! locks are released. Debug tooling renders a snapshot directly or through
//! [`InjectorSnapshot::to_json`].

use serde::Serialize;

use crate::global::GlobalCallbacks;
use crate::owner::{OwnerHandle, OwnerId};
use crate::phase::Phase;
use crate::registry::Registry;

/// Everything registered with an injector, grouped by phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectorSnapshot {
    /// Whether the dispatch leaves have been spliced into a loop.
    pub installed: bool,
    /// Number of owner records, including stale ones not yet evicted.
    pub registrations: usize,
    /// One entry per phase, in frame order.
    pub phases: Vec<PhaseSnapshot>,
}

/// Callbacks attached to one phase, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSnapshot {
    /// The phase.
    pub phase: Phase,
    /// Labels of global callbacks.
    pub global: Vec<String>,
    /// Owner callbacks.
    pub entries: Vec<EntrySnapshot>,
}

/// One owner's callback for a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySnapshot {
    /// Type name of the owner.
    pub owner_type: &'static str,
    /// Identity of the owner.
    pub owner_id: OwnerId,
    /// Whether the owner is still live.
    pub alive: bool,
    /// Label of the callback.
    pub callback: String,
}

/// Registry contents copied under the lock, before liveness is known.
pub(crate) struct SnapshotCapture {
    installed: bool,
    registrations: usize,
    phases: Vec<(Phase, Vec<String>, Vec<(OwnerHandle, String)>)>,
}

impl SnapshotCapture {
    pub(crate) fn new(installed: bool, registry: &Registry, global: &GlobalCallbacks) -> Self {
        let phases = Phase::ALL
            .into_iter()
            .map(|phase| {
                let global = global
                    .get(phase)
                    .iter()
                    .map(|callback| callback.label().to_string())
                    .collect();
                let entries = registry
                    .callbacks_for(phase)
                    .into_iter()
                    .map(|(owner, callback)| (owner, callback.label().to_string()))
                    .collect();
                (phase, global, entries)
            })
            .collect();

        Self {
            installed,
            registrations: registry.len(),
            phases,
        }
    }

    /// Probes each owner and builds the snapshot. Call with no lock held.
    pub(crate) fn resolve(self) -> InjectorSnapshot {
        let phases = self
            .phases
            .into_iter()
            .map(|(phase, global, entries)| PhaseSnapshot {
                phase,
                global,
                entries: entries
                    .into_iter()
                    .map(|(owner, callback)| EntrySnapshot {
                        owner_type: owner.type_name(),
                        owner_id: owner.id(),
                        alive: owner.is_alive(),
                        callback,
                    })
                    .collect(),
            })
            .collect();

        InjectorSnapshot {
            installed: self.installed,
            registrations: self.registrations,
            phases,
        }
    }
}

impl InjectorSnapshot {
    /// Returns the snapshot for `phase`.
    #[must_use]
    pub fn phase(&self, phase: Phase) -> &PhaseSnapshot {
        &self.phases[phase.index()]
    }

    /// Returns true if nothing is attached to any phase.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases
            .iter()
            .all(|phase| phase.global.is_empty() && phase.entries.is_empty())
    }

    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
