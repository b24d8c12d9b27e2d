//! The live store of per-owner registrations.
//!
//! Records are kept in insertion order, which is the order they are
//! dispatched in. An owner index maps each [`OwnerId`] to its slot so merges
//! and removals do not scan.
//!
//! # Storage
//!
//! Removal leaves a tombstone in the slot vector rather than shifting later
//! records, so slot indices held by the owner index stay valid. Tombstones
//! are compacted during [`Registry::evict_stale`], which runs once per frame,
//! or when they outnumber live records.
//!
//! # Host code
//!
//! The injector keeps the registry behind a lock. Apart from
//! [`Registry::contains`], nothing here probes liveness, and every record or
//! callback that leaves the registry is handed back to the caller. Liveness
//! probes and the closures a record captures may call back into the
//! injector, so they must only run once the lock is released.

use hashbrown::HashMap;

use crate::callback::Callback;
use crate::owner::{OwnerHandle, OwnerId};
use crate::phase::Phase;
use crate::record::{PhaseCallbacks, Registration};

/// Ordered registrations with an owner index.
#[derive(Debug, Default)]
pub struct Registry {
    /// Records in insertion order. `None` marks a removed record.
    slots: Vec<Option<Registration>>,
    /// Maps each registered owner to its slot.
    index: HashMap<OwnerId, usize>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Sets `owner`'s callback for `phase`, creating the record if needed.
    ///
    /// Returns the callback previously set for the same owner and phase.
    pub fn upsert(&mut self, owner: &OwnerHandle, phase: Phase, callback: Callback) -> Option<Callback> {
        self.entry(owner).callbacks_mut().set(phase, callback)
    }

    /// Merges a full set of callbacks into `owner`'s record.
    ///
    /// Returns the callbacks that were replaced.
    pub fn upsert_full(&mut self, owner: &OwnerHandle, callbacks: PhaseCallbacks) -> PhaseCallbacks {
        self.entry(owner).callbacks_mut().merge(callbacks)
    }

    /// Removes `owner`'s record, live or not, and returns it.
    #[must_use = "the removed record should be dropped outside the lock"]
    pub fn remove(&mut self, owner: OwnerId) -> Option<Registration> {
        let slot = self.index.remove(&owner)?;
        let removed = self.slots[slot].take();
        self.compact_if_sparse();
        removed
    }

    /// Removes the record held under `owner`, but only if it is the record
    /// `owner` was taken from. A newer record under the same id is kept.
    #[must_use = "the removed record should be dropped outside the lock"]
    pub fn remove_record(&mut self, owner: &OwnerHandle) -> Option<Registration> {
        let removed = self.detach(owner)?;
        self.compact_if_sparse();
        Some(removed)
    }

    /// Returns true if `owner` has a record whose handle is still live.
    ///
    /// Probes liveness, so it must not be called under the injector's lock.
    #[must_use]
    pub fn contains(&self, owner: OwnerId) -> bool {
        self.owner(owner).is_some_and(|handle| handle.is_alive())
    }

    /// Returns `owner`'s record, live or not.
    #[must_use]
    pub fn get(&self, owner: OwnerId) -> Option<&Registration> {
        self.index
            .get(&owner)
            .and_then(|slot| self.slots[*slot].as_ref())
    }

    /// Returns a clone of the handle recorded for `owner`.
    #[must_use]
    pub fn owner(&self, owner: OwnerId) -> Option<OwnerHandle> {
        self.get(owner).map(|record| record.owner().clone())
    }

    /// Returns clones of every recorded handle, in dispatch order.
    #[must_use]
    pub fn owners(&self) -> Vec<OwnerHandle> {
        self.iter().map(|record| record.owner().clone()).collect()
    }

    /// Returns the number of records, including stale ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Removes the records of every owner in `stale` and compacts.
    ///
    /// `stale` holds handles taken from [`owners`](Self::owners) and found
    /// dead. A handle whose record has since been replaced evicts nothing.
    /// Returns the evicted records.
    #[must_use = "evicted records should be dropped outside the lock"]
    pub fn evict_stale(&mut self, stale: &[OwnerHandle]) -> Vec<Registration> {
        let evicted: Vec<Registration> = stale.iter().filter_map(|owner| self.detach(owner)).collect();
        self.compact();
        evicted
    }

    /// Iterates records in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.slots.iter().flatten()
    }

    /// Snapshots `phase`'s callbacks in dispatch order, with their owners.
    #[must_use]
    pub fn callbacks_for(&self, phase: Phase) -> Vec<(OwnerHandle, Callback)> {
        self.iter()
            .filter_map(|record| {
                record
                    .callback(phase)
                    .map(|callback| (record.owner().clone(), callback.clone()))
            })
            .collect()
    }

    /// Removes every record and returns them in dispatch order.
    #[must_use = "removed records should be dropped outside the lock"]
    pub fn clear(&mut self) -> Vec<Registration> {
        self.index.clear();
        self.slots.drain(..).flatten().collect()
    }

    /// Returns `owner`'s record, appending a new one if absent.
    fn entry(&mut self, owner: &OwnerHandle) -> &mut Registration {
        let id = owner.id();
        let slot = match self.index.get(&id) {
            Some(&slot) => slot,
            None => {
                let slot = self.slots.len();
                self.slots.push(None);
                self.index.insert(id, slot);
                slot
            }
        };
        self.slots[slot].get_or_insert_with(|| Registration::new(owner.clone()))
    }

    /// Takes `owner`'s record out of its slot if it still holds `owner`.
    fn detach(&mut self, owner: &OwnerHandle) -> Option<Registration> {
        let id = owner.id();
        let slot = *self.index.get(&id)?;
        let matches = self.slots[slot]
            .as_ref()
            .is_some_and(|record| record.owner().same_as(owner));
        if !matches {
            return None;
        }
        self.index.remove(&id);
        self.slots[slot].take()
    }

    fn tombstones(&self) -> usize {
        self.slots.len() - self.index.len()
    }

    fn compact_if_sparse(&mut self) {
        if self.tombstones() > self.index.len() {
            self.compact();
        }
    }

    /// Drops tombstones and rebuilds the owner index.
    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        self.index.clear();
        for (slot, record) in self.slots.iter().enumerate() {
            if let Some(record) = record {
                self.index.insert(record.owner().id(), slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ids(registry: &Registry) -> Vec<OwnerId> {
        registry.iter().map(|record| record.owner().id()).collect()
    }

    #[test]
    fn upsert_creates_one_record_per_owner() {
        let mut registry = Registry::new();
        let owner = Arc::new(1_u8);
        let handle = OwnerHandle::new(&owner);

        registry.upsert(&handle, Phase::Update, Callback::new(|| {}));
        registry.upsert(&handle, Phase::PreUpdate, Callback::new(|| {}));

        assert_eq!(registry.len(), 1);
        let record = registry.get(handle.id()).unwrap();
        assert!(record.callback(Phase::Update).is_some());
        assert!(record.callback(Phase::PreUpdate).is_some());
    }

    #[test]
    fn upsert_same_phase_replaces() {
        let mut registry = Registry::new();
        let owner = Arc::new(1_u8);
        let handle = OwnerHandle::new(&owner);
        let first = Callback::new(|| {});
        let latest = Callback::new(|| {});

        assert!(registry.upsert(&handle, Phase::Update, first.clone()).is_none());
        let replaced = registry.upsert(&handle, Phase::Update, latest.clone());

        assert!(replaced.unwrap().same_as(&first));
        let snapshot = registry.callbacks_for(Phase::Update);
        assert_eq!(snapshot.len(), 1, "replaces, never stacks");
        assert!(snapshot[0].1.same_as(&latest));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = Registry::new();
        let owner = Arc::new(1_u8);
        let handle = OwnerHandle::new(&owner);
        registry.upsert(&handle, Phase::Update, Callback::new(|| {}));

        let removed = registry.remove(handle.id()).unwrap();
        assert!(removed.owner().same_as(&handle));
        assert!(registry.remove(handle.id()).is_none());
        assert!(!registry.contains(handle.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_preserves_order_of_survivors() {
        let mut registry = Registry::new();
        let owners: Vec<_> = (0..5_u8).map(Arc::new).collect();
        for owner in &owners {
            registry.upsert(&OwnerHandle::new(owner), Phase::Update, Callback::new(|| {}));
        }

        assert!(registry.remove(OwnerId::of(&owners[1])).is_some());
        assert!(registry.remove(OwnerId::of(&owners[3])).is_some());

        assert_eq!(
            ids(&registry),
            vec![
                OwnerId::of(&owners[0]),
                OwnerId::of(&owners[2]),
                OwnerId::of(&owners[4])
            ]
        );
        // index still resolves past tombstones
        assert!(registry.contains(OwnerId::of(&owners[4])));
    }

    #[test]
    fn remove_record_keeps_newer_record() {
        let mut registry = Registry::new();
        let owner = Arc::new(1_u8);
        let old = OwnerHandle::new(&owner);
        registry.upsert(&old, Phase::Update, Callback::new(|| {}));
        let taken = registry.remove_record(&old).unwrap();
        assert!(taken.owner().same_as(&old));

        let new = OwnerHandle::new(&owner);
        registry.upsert(&new, Phase::Update, Callback::new(|| {}));

        assert!(registry.remove_record(&old).is_none(), "handle no longer recorded");
        assert!(registry.owner(new.id()).unwrap().same_as(&new));
    }

    #[test]
    fn evict_stale_drops_listed_dead_owners_only() {
        let mut registry = Registry::new();
        let keep = Arc::new(1_u8);
        let dead = Arc::new(2_u8);
        registry.upsert(&OwnerHandle::new(&keep), Phase::Update, Callback::new(|| {}));
        registry.upsert(&OwnerHandle::new(&dead), Phase::Update, Callback::new(|| {}));
        let dead_id = OwnerId::of(&dead);

        drop(dead);
        assert_eq!(registry.len(), 2, "eviction is lazy");
        assert!(!registry.contains(dead_id));

        let stale: Vec<OwnerHandle> = registry.owners().into_iter().filter(|owner| !owner.is_alive()).collect();
        let evicted = registry.evict_stale(&stale);

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].owner().id(), dead_id);
        assert_eq!(ids(&registry), vec![OwnerId::of(&keep)]);
        assert!(registry.evict_stale(&stale).is_empty());
    }

    #[test]
    fn callbacks_for_skips_records_without_phase() {
        let mut registry = Registry::new();
        let a = Arc::new(1_u8);
        let b = Arc::new(2_u8);
        registry.upsert(&OwnerHandle::new(&a), Phase::Update, Callback::new(|| {}));
        registry.upsert(&OwnerHandle::new(&b), Phase::EndOfFrame, Callback::new(|| {}));

        let update = registry.callbacks_for(Phase::Update);
        assert_eq!(update.len(), 1);
        assert_eq!(update[0].0.id(), OwnerId::of(&a));
        assert!(registry.callbacks_for(Phase::FixedUpdate).is_empty());
    }

    #[test]
    fn reregistering_after_removal_appends() {
        let mut registry = Registry::new();
        let a = Arc::new(1_u8);
        let b = Arc::new(2_u8);
        registry.upsert(&OwnerHandle::new(&a), Phase::Update, Callback::new(|| {}));
        registry.upsert(&OwnerHandle::new(&b), Phase::Update, Callback::new(|| {}));

        assert!(registry.remove(OwnerId::of(&a)).is_some());
        registry.upsert(&OwnerHandle::new(&a), Phase::Update, Callback::new(|| {}));

        assert_eq!(ids(&registry), vec![OwnerId::of(&b), OwnerId::of(&a)]);
    }

    #[test]
    fn clear_returns_records_in_order() {
        let mut registry = Registry::new();
        assert!(registry.clear().is_empty());

        let a = Arc::new(1_u8);
        let b = Arc::new(2_u8);
        registry.upsert(&OwnerHandle::new(&a), Phase::Update, Callback::new(|| {}));
        registry.upsert(&OwnerHandle::new(&b), Phase::Update, Callback::new(|| {}));

        let cleared: Vec<OwnerId> = registry.clear().iter().map(|record| record.owner().id()).collect();
        assert_eq!(cleared, vec![OwnerId::of(&a), OwnerId::of(&b)]);
        assert!(registry.is_empty());
    }
}
