//! The fixed, ordered set of execution phases.
//!
//! Every frame visits the phases in declaration order, except
//! [`Phase::FixedUpdate`], which the host may run zero or more times
//! between [`Phase::EarlyUpdate`] and [`Phase::PreUpdate`].

use core::fmt;
use core::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::InvalidPhase;

/// A phase of the host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// Start of the frame. Stale registrations are evicted here.
    Initialization,
    /// After input is polled.
    EarlyUpdate,
    /// Once per fixed simulation step.
    FixedUpdate,
    /// Just before gameplay scripts.
    PreUpdate,
    /// With gameplay scripts.
    Update,
    /// With late scripts, after gameplay.
    PostUpdate,
    /// Before the frame is presented.
    EndOfFrame,
}

impl Phase {
    /// Number of phases.
    pub const COUNT: usize = 7;

    /// All phases in frame order.
    pub const ALL: [Phase; Phase::COUNT] = [
        Phase::Initialization,
        Phase::EarlyUpdate,
        Phase::FixedUpdate,
        Phase::PreUpdate,
        Phase::Update,
        Phase::PostUpdate,
        Phase::EndOfFrame,
    ];

    /// Returns the phase's position in frame order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the phase at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPhase`] if `index` is not below [`Phase::COUNT`].
    pub fn from_index(index: usize) -> Result<Self, InvalidPhase> {
        Phase::ALL
            .get(index)
            .copied()
            .ok_or_else(|| InvalidPhase::new(index.to_string()))
    }

    /// Returns the phase's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Initialization => "Initialization",
            Phase::EarlyUpdate => "EarlyUpdate",
            Phase::FixedUpdate => "FixedUpdate",
            Phase::PreUpdate => "PreUpdate",
            Phase::Update => "Update",
            Phase::PostUpdate => "PostUpdate",
            Phase::EndOfFrame => "EndOfFrame",
        }
    }

    /// Returns the single-phase set for this phase.
    #[must_use]
    pub const fn as_set(self) -> PhaseSet {
        match self {
            Phase::Initialization => PhaseSet::INITIALIZATION,
            Phase::EarlyUpdate => PhaseSet::EARLY_UPDATE,
            Phase::FixedUpdate => PhaseSet::FIXED_UPDATE,
            Phase::PreUpdate => PhaseSet::PRE_UPDATE,
            Phase::Update => PhaseSet::UPDATE,
            Phase::PostUpdate => PhaseSet::POST_UPDATE,
            Phase::EndOfFrame => PhaseSet::END_OF_FRAME,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Phase {
    type Error = InvalidPhase;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Phase::from_index(usize::from(value))
    }
}

impl FromStr for Phase {
    type Err = InvalidPhase;

    /// Parses a phase name, ignoring ASCII case and `_`/`-` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Phase::ALL
            .into_iter()
            .find(|phase| phase.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| InvalidPhase::new(s))
    }
}

bitflags! {
    /// A set of phases.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PhaseSet: u8 {
        /// [`Phase::Initialization`].
        const INITIALIZATION = 1 << 0;
        /// [`Phase::EarlyUpdate`].
        const EARLY_UPDATE = 1 << 1;
        /// [`Phase::FixedUpdate`].
        const FIXED_UPDATE = 1 << 2;
        /// [`Phase::PreUpdate`].
        const PRE_UPDATE = 1 << 3;
        /// [`Phase::Update`].
        const UPDATE = 1 << 4;
        /// [`Phase::PostUpdate`].
        const POST_UPDATE = 1 << 5;
        /// [`Phase::EndOfFrame`].
        const END_OF_FRAME = 1 << 6;
    }
}

impl PhaseSet {
    /// Returns true if `phase` is in the set.
    #[must_use]
    pub fn has(self, phase: Phase) -> bool {
        self.contains(phase.as_set())
    }

    /// Iterates the phases in the set, in frame order.
    pub fn phases(self) -> impl Iterator<Item = Phase> {
        Phase::ALL.into_iter().filter(move |phase| self.has(*phase))
    }
}

impl From<Phase> for PhaseSet {
    fn from(phase: Phase) -> Self {
        phase.as_set()
    }
}

impl FromIterator<Phase> for PhaseSet {
    fn from_iter<I: IntoIterator<Item = Phase>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PhaseSet::empty(), |set, phase| set | phase.as_set())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch node markers
// ─────────────────────────────────────────────────────────────────────────────

/// Node markers for the dispatch leaves spliced into the host loop.
pub mod markers {
    use phaseloop_pipeline::node::{LoopSystem, NodeType};

    use super::Phase;

    /// Dispatch leaf for [`Phase::Initialization`].
    pub struct InjectedInitialization;
    impl LoopSystem for InjectedInitialization {}

    /// Dispatch leaf for [`Phase::EarlyUpdate`].
    pub struct InjectedEarlyUpdate;
    impl LoopSystem for InjectedEarlyUpdate {}

    /// Dispatch leaf for [`Phase::FixedUpdate`].
    pub struct InjectedFixedUpdate;
    impl LoopSystem for InjectedFixedUpdate {}

    /// Dispatch leaf for [`Phase::PreUpdate`].
    pub struct InjectedPreUpdate;
    impl LoopSystem for InjectedPreUpdate {}

    /// Dispatch leaf for [`Phase::Update`].
    pub struct InjectedUpdate;
    impl LoopSystem for InjectedUpdate {}

    /// Dispatch leaf for [`Phase::PostUpdate`].
    pub struct InjectedPostUpdate;
    impl LoopSystem for InjectedPostUpdate {}

    /// Dispatch leaf for [`Phase::EndOfFrame`].
    pub struct InjectedEndOfFrame;
    impl LoopSystem for InjectedEndOfFrame {}

    /// Returns the dispatch leaf type for `phase`.
    #[must_use]
    pub fn dispatch_node(phase: Phase) -> NodeType {
        match phase {
            Phase::Initialization => NodeType::of::<InjectedInitialization>(),
            Phase::EarlyUpdate => NodeType::of::<InjectedEarlyUpdate>(),
            Phase::FixedUpdate => NodeType::of::<InjectedFixedUpdate>(),
            Phase::PreUpdate => NodeType::of::<InjectedPreUpdate>(),
            Phase::Update => NodeType::of::<InjectedUpdate>(),
            Phase::PostUpdate => NodeType::of::<InjectedPostUpdate>(),
            Phase::EndOfFrame => NodeType::of::<InjectedEndOfFrame>(),
        }
    }
}
