//! The host's frame loop.

use core::fmt;

use crate::host;
use crate::node::{NodeType, PipelineNode};
use crate::splice::{self, InsertPosition, SpliceError, SpliceRequest};

/// A host frame loop: a tree of execution nodes run once per frame.
///
/// # Example
///
/// ```
/// use phaseloop_pipeline::PlayerLoop;
/// use phaseloop_pipeline::host::Update;
/// use phaseloop_pipeline::node::{NodeType, PipelineNode};
/// use phaseloop_pipeline::splice::InsertPosition;
///
/// pub struct MyUpdate;
///
/// let mut player_loop = PlayerLoop::default_loop();
/// player_loop
///     .splice(
///         NodeType::of::<Update>(),
///         PipelineNode::with_update::<MyUpdate>(|| {}),
///         InsertPosition::First,
///     )
///     .expect("default loop has an Update stage");
///
/// player_loop.run_frame(1);
/// ```
#[derive(Debug, Clone)]
pub struct PlayerLoop {
    root: PipelineNode,
}

impl PlayerLoop {
    /// Wraps an existing tree.
    #[must_use]
    pub fn new(root: PipelineNode) -> Self {
        Self { root }
    }

    /// Returns the host's default loop. See [`host`] for its layout.
    #[must_use]
    pub fn default_loop() -> Self {
        Self::new(host::default_tree())
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &PipelineNode {
        &self.root
    }

    /// Finds the first node of the given type, depth-first.
    #[must_use]
    pub fn find(&self, node_type: NodeType) -> Option<&PipelineNode> {
        self.root.find(node_type)
    }

    /// Returns true if a node of the given type exists in the loop.
    #[must_use]
    pub fn contains(&self, node_type: NodeType) -> bool {
        self.find(node_type).is_some()
    }

    /// Inserts `node` under the first node of type `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SpliceError::TargetNotFound`] if no such node exists.
    pub fn splice(
        &mut self,
        target: NodeType,
        node: PipelineNode,
        position: InsertPosition,
    ) -> Result<(), SpliceError> {
        splice::splice(&mut self.root, target, node, position)
    }

    /// Applies each request, returning one result per request.
    pub fn splice_all(
        &mut self,
        requests: impl IntoIterator<Item = SpliceRequest>,
    ) -> Vec<Result<(), SpliceError>> {
        splice::splice_all(&mut self.root, requests)
    }

    /// Runs one frame.
    ///
    /// Fixed-step subtrees run `fixed_steps` times; every other node runs
    /// exactly once, depth-first in child order.
    pub fn run_frame(&self, fixed_steps: u32) {
        self.root.run(fixed_steps);
    }

    /// Runs `frames` frames with the same fixed-step count.
    pub fn run_frames(&self, frames: usize, fixed_steps: u32) {
        for _ in 0..frames {
            self.run_frame(fixed_steps);
        }
    }
}

impl Default for PlayerLoop {
    fn default() -> Self {
        Self::default_loop()
    }
}

/// Prints the node types of the loop, one per line, indented by depth.
impl fmt::Display for PlayerLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_tree(f, 0)
    }
}
