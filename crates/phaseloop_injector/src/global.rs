//! Ownerless callbacks that fire before every registration.
//!
//! Each phase holds a list of callbacks in attach order. There is no owner
//! tracking and no eviction; whoever attaches a callback detaches it.

use crate::callback::Callback;
use crate::phase::Phase;

/// Per-phase multicast callback lists.
#[derive(Debug, Clone, Default)]
pub struct GlobalCallbacks {
    phases: [Vec<Callback>; Phase::COUNT],
}

impl GlobalCallbacks {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `callback` to `phase`. The same callback may be attached
    /// more than once and then fires once per attachment.
    pub fn add(&mut self, phase: Phase, callback: Callback) {
        self.phases[phase.index()].push(callback);
    }

    /// Detaches the most recent attachment of `callback` from `phase`.
    ///
    /// Returns the detached attachment, or `None` if it was not attached.
    #[must_use = "the detached callback should be dropped outside the lock"]
    pub fn remove(&mut self, phase: Phase, callback: &Callback) -> Option<Callback> {
        let list = &mut self.phases[phase.index()];
        let position = list.iter().rposition(|attached| attached.same_as(callback))?;
        Some(list.remove(position))
    }

    /// Returns `phase`'s callbacks in attach order.
    #[must_use]
    pub fn get(&self, phase: Phase) -> &[Callback] {
        &self.phases[phase.index()]
    }

    /// Returns the total number of attachments across all phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Returns true if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(Vec::is_empty)
    }

    /// Detaches everything, returning the attachments in frame order.
    #[must_use = "detached callbacks should be dropped outside the lock"]
    pub fn clear(&mut self) -> Vec<Callback> {
        self.phases.iter_mut().flat_map(core::mem::take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_attach_order() {
        let mut global = GlobalCallbacks::new();
        let a = Callback::new(|| {}).named("a");
        let b = Callback::new(|| {}).named("b");

        global.add(Phase::Update, a);
        global.add(Phase::Update, b);

        let labels: Vec<_> = global.get(Phase::Update).iter().map(Callback::label).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert!(global.get(Phase::PreUpdate).is_empty());
    }

    #[test]
    fn remove_detaches_last_attachment() {
        let mut global = GlobalCallbacks::new();
        let a = Callback::new(|| {});
        let b = Callback::new(|| {});

        global.add(Phase::Update, a.clone());
        global.add(Phase::Update, b.clone());
        global.add(Phase::Update, a.clone());

        assert!(global.remove(Phase::Update, &a).unwrap().same_as(&a));
        let remaining = global.get(Phase::Update);
        assert_eq!(remaining.len(), 2);
        assert!(remaining[0].same_as(&a));
        assert!(remaining[1].same_as(&b));
    }

    #[test]
    fn remove_unknown_callback_is_noop() {
        let mut global = GlobalCallbacks::new();
        global.add(Phase::Update, Callback::new(|| {}));

        assert!(global.remove(Phase::Update, &Callback::new(|| {})).is_none());
        assert!(global.remove(Phase::EndOfFrame, &Callback::new(|| {})).is_none());
        assert_eq!(global.len(), 1);
    }

    #[test]
    fn clear_empties_every_phase() {
        let mut global = GlobalCallbacks::new();
        for phase in Phase::ALL {
            global.add(phase, Callback::new(|| {}));
        }
        assert_eq!(global.len(), Phase::COUNT);

        assert_eq!(global.clear().len(), Phase::COUNT);
        assert!(global.is_empty());
    }
}
