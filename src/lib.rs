//! Inject per-phase callbacks into a host frame loop you do not own.
//!
//! Re-exports the phaseloop crates for convenience.

/// Layer 1: host loop model and splicing.
pub use phaseloop_pipeline as pipeline;

/// Layer 2: phases, registry and dispatch.
pub use phaseloop_injector as injector;

/// Tracing subscriber configuration.
pub use phaseloop_tracing as tracing;

pub use phaseloop_injector::shared;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use phaseloop_injector::prelude::*;
    pub use phaseloop_pipeline::{InsertPosition, NodeType, PipelineNode, PlayerLoop};
    pub use phaseloop_tracing::{TracingConfig, TracingFormat};
}
