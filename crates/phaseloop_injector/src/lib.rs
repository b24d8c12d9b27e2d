//! Phase-based callback injection for phaseloop (Layer 2).
//!
//! `phaseloop_injector` lets independent components run code at fixed points
//! of a host frame loop they do not own, and take that code out again.
//!
//! # Core Concepts
//!
//! - [`Phase`] - The seven ordered execution phases of a frame
//! - [`Callback`] - A labelled function fired when a phase runs
//! - [`OwnerHandle`] - Weak reference to the object callbacks belong to
//! - [`Injectable`] - Objects that declare their phases and are registered whole
//! - [`Injector`] - Registry, global callbacks and dispatcher in one facade
//! - [`shared()`] - The process-wide injector
//!
//! # Dispatch Order
//!
//! Every phase first runs its global callbacks in attach order, then one
//! callback per live owner in registration order. Owners that are no longer
//! live are skipped, and removed at the next [`Phase::Initialization`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use phaseloop_injector::prelude::*;
//! use phaseloop_pipeline::PlayerLoop;
//!
//! struct Hud;
//!
//! impl Injectable for Hud {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::Only(PhaseSet::END_OF_FRAME)
//!     }
//!
//!     fn end_of_frame(&self) -> CallbackResult {
//!         Ok(())
//!     }
//! }
//!
//! let injector = Arc::new(Injector::new());
//! let mut player_loop = PlayerLoop::default_loop();
//! injector.install(&mut player_loop)?;
//!
//! let hud = Arc::new(Hud);
//! injector.register(&hud);
//! player_loop.run_frame(1);
//! # Ok::<(), InjectorError>(())
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`phaseloop_pipeline`): the host loop and splicing
//! - **Layer 2** (`phaseloop_injector`): phases, registry and dispatch (this crate)

/// Execution phases and phase sets.
pub mod phase;

/// Phase callbacks and their failures.
pub mod callback;

/// Weak owner handles and owner identity.
pub mod owner;

/// Per-owner registration records.
pub mod record;

/// Ordered store of registrations.
pub mod registry;

/// Ownerless per-phase callbacks.
pub mod global;

/// Capability declaration and resolution.
pub mod capability;

/// Injector configuration.
pub mod config;

/// Dispatch reports.
pub mod dispatch;

/// Read-only snapshots for debug tooling.
pub mod introspect;

/// Error types.
pub mod error;

/// The process-wide injector and free functions over it.
pub mod shared;

mod injector;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::callback::{Callback, CallbackError, CallbackResult};
    pub use crate::capability::{Capabilities, Injectable};
    pub use crate::config::InjectorConfig;
    pub use crate::dispatch::DispatchReport;
    pub use crate::error::{InjectorError, InvalidPhase};
    pub use crate::injector::{InstallReport, Injector};
    pub use crate::owner::{Lifecycle, OwnerHandle, OwnerId, WeakHandle};
    pub use crate::phase::{Phase, PhaseSet};
}

// Re-export key types at crate root for convenience
pub use callback::{BoxError, Callback, CallbackError, CallbackResult};
pub use capability::{Capabilities, Injectable};
pub use config::{InjectorConfig, PhaseMapping};
pub use dispatch::DispatchReport;
pub use error::{InjectorError, InvalidPhase, PhaseSpliceError};
pub use injector::{InstallReport, Injector};
pub use introspect::{EntrySnapshot, InjectorSnapshot, PhaseSnapshot};
pub use owner::{Lifecycle, OwnerHandle, OwnerId, WeakHandle};
pub use phase::{Phase, PhaseSet};
pub use shared::shared;
