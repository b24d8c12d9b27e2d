//! Host frame-loop model for phaseloop (Layer 1).
//!
//! `phaseloop_pipeline` models the runtime the injector does not own: a tree
//! of execution nodes that the host walks once per frame.
//!
//! - [`node`] - Node identity ([`NodeType`]) and tree nodes ([`PipelineNode`])
//! - [`host`] - Markers and layout of the default host loop
//! - [`splice`] - One-time insertion of new nodes into an existing tree
//! - [`PlayerLoop`] - The loop itself: lookup, splicing and frame execution
//!
//! # Architecture
//!
//! - **Layer 1** (`phaseloop_pipeline`): the host loop (this crate)
//! - **Layer 2** (`phaseloop_injector`): phases, registry and dispatch,
//!   spliced into a [`PlayerLoop`] at startup

/// Node identity and tree nodes.
pub mod node;

/// Default host loop layout.
pub mod host;

/// Structural insertion into a loop tree.
pub mod splice;

mod player_loop;

pub use node::{LoopSystem, NodeType, PipelineNode, UpdateFn};
pub use player_loop::PlayerLoop;
pub use splice::{InsertPosition, SpliceError, SpliceRequest};
