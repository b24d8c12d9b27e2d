//! Injector configuration.
//!
//! # Example
//!
//! ```
//! use phaseloop_injector::{InjectorConfig, Phase};
//! use phaseloop_pipeline::host::PostLateUpdate;
//! use phaseloop_pipeline::node::NodeType;
//! use phaseloop_pipeline::splice::InsertPosition;
//!
//! let config = InjectorConfig::default()
//!     .with_isolate_panics(false)
//!     .with_mapping(Phase::PostUpdate, NodeType::of::<PostLateUpdate>(), InsertPosition::Last);
//!
//! assert!(!config.isolate_panics());
//! ```

use phaseloop_pipeline::host;
use phaseloop_pipeline::node::NodeType;
use phaseloop_pipeline::splice::InsertPosition;

use crate::phase::Phase;

/// Environment variable read by [`InjectorConfig::from_env`].
pub const ISOLATE_PANICS_ENV: &str = "PHASELOOP_ISOLATE_PANICS";

/// Where a phase's dispatch leaf is spliced into the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseMapping {
    /// Host node to insert under.
    pub target: NodeType,
    /// Position among the target's children.
    pub position: InsertPosition,
}

impl PhaseMapping {
    /// Maps to the first child position of `target`.
    #[must_use]
    pub fn first(target: NodeType) -> Self {
        Self {
            target,
            position: InsertPosition::First,
        }
    }

    /// Returns the default mapping for `phase` into the default host loop.
    #[must_use]
    pub fn default_for(phase: Phase) -> Self {
        let target = match phase {
            Phase::Initialization => NodeType::of::<host::Initialization>(),
            Phase::EarlyUpdate => NodeType::of::<host::EarlyUpdate>(),
            Phase::FixedUpdate => NodeType::of::<host::FixedUpdate>(),
            Phase::PreUpdate => NodeType::of::<host::PreUpdate>(),
            Phase::Update => NodeType::of::<host::Update>(),
            Phase::PostUpdate => NodeType::of::<host::PreLateUpdate>(),
            Phase::EndOfFrame => NodeType::of::<host::PostLateUpdate>(),
        };
        Self::first(target)
    }
}

/// Configuration for an [`Injector`](crate::Injector).
#[derive(Debug, Clone)]
pub struct InjectorConfig {
    isolate_panics: bool,
    mappings: [PhaseMapping; Phase::COUNT],
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            isolate_panics: true,
            mappings: Phase::ALL.map(PhaseMapping::default_for),
        }
    }
}

impl InjectorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the default configuration, overridden by the environment.
    ///
    /// `PHASELOOP_ISOLATE_PANICS` accepts `1`/`true`/`yes`/`on` and
    /// `0`/`false`/`no`/`off`. Unrecognized values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(ISOLATE_PANICS_ENV) {
            Ok(value) => match parse_flag(&value) {
                Some(flag) => config.with_isolate_panics(flag),
                None => {
                    tracing::warn!(
                        variable = ISOLATE_PANICS_ENV,
                        value = %value,
                        "ignoring unrecognized boolean"
                    );
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Sets whether callback panics are caught and reported.
    ///
    /// When false, a panicking callback unwinds into the host loop.
    #[must_use]
    pub fn with_isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    /// Overrides where `phase`'s dispatch leaf is spliced.
    #[must_use]
    pub fn with_mapping(mut self, phase: Phase, target: NodeType, position: InsertPosition) -> Self {
        self.mappings[phase.index()] = PhaseMapping { target, position };
        self
    }

    /// Returns whether callback panics are caught.
    #[must_use]
    pub fn isolate_panics(&self) -> bool {
        self.isolate_panics
    }

    /// Returns `phase`'s splice mapping.
    #[must_use]
    pub fn mapping(&self, phase: Phase) -> PhaseMapping {
        self.mappings[phase.index()]
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
